//! # Font compiler
//!
//! Turns a finished font source into a binary font.
//!
//! [`FontCompiler`] is the compiler interface used by the build pipeline;
//! [`TrueTypeCompiler`] is the built-in implementation for quadratic
//! outlines.

mod error;
mod glyph_order;
mod truetype;

use fontbuild_font_model::Font;

pub use error::{Error, Result};
pub use glyph_order::{NOTDEF, resolve_glyph_order};
pub use truetype::TrueTypeCompiler;

/// Binary output flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// Quadratic `glyf` outlines.
    TrueType,
    /// Cubic `CFF` outlines.
    OpenType,
}

impl OutputFormat {
    /// File extension, also used for the output directory suffix.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::TrueType => "ttf",
            OutputFormat::OpenType => "otf",
        }
    }
}

pub trait FontCompiler: Send + Sync {
    /// Whether [`FontCompiler::compile`] can produce `format` at all.
    fn supports(&self, _format: OutputFormat) -> bool {
        true
    }

    /// Compile `font` with glyphs ordered by `glyph_order` first.
    fn compile(&self, font: &Font, glyph_order: &[String], format: OutputFormat) -> Result<Vec<u8>>;
}
