//! # Font curves
//!
//! Cubic to quadratic curve conversion across a family of fonts.
//!
//! Glyphs with the same name in different fonts are converted jointly so
//! that they keep identical point structure and remain interpolatable.

mod convert;
mod error;

pub use convert::{CurveConverter, SplineConverter};
pub use error::{Error, Result};

/// Default conversion tolerance, as a fraction of units per em.
///
/// Larger values give dots visibly fewer control points.
pub const MAX_ERR_EM: f64 = 0.002;
