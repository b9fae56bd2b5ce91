use std::result;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("glyphs are not compatible for joint conversion: {}", glyphs.join(", "))]
    Incompatible { glyphs: Vec<String> },

    #[error("could not approximate curves of glyph '{glyph}' within {max_err} units")]
    Approximation { glyph: String, max_err: f64 },

    #[error("unsupported curve in glyph '{glyph}': {message}")]
    Unsupported { glyph: String, message: String },
}

pub type Result<T> = result::Result<T, Error>;
