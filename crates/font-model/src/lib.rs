//! # Font model
//!
//! The in-memory font representation shared by every stage of the instance
//! pipeline: a name-keyed glyph map plus UFO font info and feature text.
//!
//! Geometry is expressed with [`kurbo`] types so that transforms, paths and
//! areas come from one place. Fonts are persisted as UFO sources through
//! [`norad`].
//!
//! ## Example
//!
//! ```no_run
//! use fontbuild_font_model::{Font, Glyph, load_ufo, save_ufo};
//!
//! let mut font = load_ufo("Roboto-Regular.ufo").unwrap();
//! font.insert(Glyph::new("space").with_width(507.0));
//! save_ufo(&font, "out/Roboto-Regular.ufo").unwrap();
//! ```

mod error;
mod font;
mod glyph;
mod ufo;

pub use error::{Error, Result};
pub use font::Font;
pub use glyph::{Anchor, Component, Contour, ContourPoint, Glyph, PointType};
pub use norad::{FontInfo, fontinfo::StyleMapStyle};
pub use ufo::{load_ufo, save_ufo};
