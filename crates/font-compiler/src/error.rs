use std::result;

use thiserror::Error;

use crate::OutputFormat;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0:?} output is not supported by this compiler")]
    UnsupportedFormat(OutputFormat),

    #[error("glyph '{0}' has cubic curves; convert to quadratic first")]
    CubicCurve(String),

    #[error("glyph '{0}' has coordinates outside the 16-bit range")]
    CoordinateOverflow(String),

    #[error("failed to flatten components: {0}")]
    Flatten(#[from] fontbuild_glyph_ops::Error),

    #[error("failed to build cmap table: {0}")]
    Cmap(String),

    #[error("failed to write font: {0}")]
    WriteError(#[from] write_fonts::error::Error),

    #[error("failed to build font: {0}")]
    BuilderError(#[from] write_fonts::BuilderError),
}

pub type Result<T> = result::Result<T, Error>;
