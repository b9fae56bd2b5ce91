//! fontbuild core - instance generation pipeline.
//!
//! A [`FontProject`] turns one base font into named instances: each
//! instance is mixed or copied, optionally italicized, cleaned up, named and
//! saved as a UFO, then the queued UFOs are converted to quadratic curves
//! and compiled to TrueType in one batch.

pub mod config;
pub mod diacritics;
pub mod io;
pub mod mix;
pub mod naming;
pub mod pipeline;
pub mod project;
pub mod queue;

pub use config::{InstanceConfig, ProjectConfig, Resources};
pub use diacritics::generate_glyphs;
pub use mix::{LinearMix, MasterMixer};
pub use naming::InstanceNames;
pub use pipeline::{BuildOptions, build, run_step};
pub use project::{BatchReport, FontProject, FontSource, InstanceOptions, Toolchain};
pub use queue::{BuildQueue, QueuedFont};
