use std::path::{Path, PathBuf};

/// An intermediate source waiting for the binary stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedFont {
    pub path: PathBuf,
}

impl QueuedFont {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl AsRef<Path> for QueuedFont {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

/// Saved instances, in the order they were built.
#[derive(Debug, Default)]
pub struct BuildQueue {
    fonts: Vec<QueuedFont>,
}

impl BuildQueue {
    pub fn push(&mut self, font: QueuedFont) {
        self.fonts.push(font);
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueuedFont> {
        self.fonts.iter()
    }

    /// Take every queued font, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<QueuedFont> {
        std::mem::take(&mut self.fonts)
    }
}
