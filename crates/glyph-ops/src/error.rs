use std::result;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Raised by an overlap resolver that cannot handle its input.
    #[error("geometry error: {0}")]
    Geometry(String),

    #[error("overlap removal failed for glyph '{glyph}': {message}")]
    Overlap { glyph: String, message: String },

    #[error("component cycle through glyph '{0}'")]
    ComponentCycle(String),

    #[error("invalid composite rule '{rule}': {message}")]
    InvalidRule { rule: String, message: String },
}

pub type Result<T> = result::Result<T, Error>;
