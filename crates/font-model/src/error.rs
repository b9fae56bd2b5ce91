use std::path::PathBuf;

/// Result type for font model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while reading or writing UFO sources.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The UFO could not be parsed.
    #[error("Failed to load UFO '{path}': {message}")]
    Load { path: PathBuf, message: String },

    /// The UFO could not be written.
    #[error("Failed to save UFO '{path}': {message}")]
    Save { path: PathBuf, message: String },

    /// A glyph, anchor or point name is not a valid UFO name.
    #[error("Invalid UFO name '{0}'")]
    InvalidName(String),
}
