//! Output paths and atomic font I/O.

use std::{
    fs::{create_dir_all, read, remove_dir_all, rename},
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use fontbuild_font_model::{Font, save_ufo};
use tempfile::Builder;

#[derive(Debug, Clone)]
pub struct FontFile {
    path: PathBuf,
}

impl FontFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Result<Vec<u8>> {
        read(&self.path).with_context(|| format!("Failed to read font: {}", self.path.display()))
    }

    /// Write through a temporary sibling file that replaces the target only
    /// once the data is complete.
    pub fn write(&self, data: impl AsRef<[u8]>) -> Result<()> {
        self.ensure_parent_dir()?;
        let mut tmp = Builder::new()
            .prefix(".fontbuild")
            .tempfile_in(self.parent())
            .with_context(|| format!("Failed to create temporary file for: {}", self.path.display()))?;
        tmp.write_all(data.as_ref())
            .with_context(|| format!("Failed to write font: {}", self.path.display()))?;
        tmp.persist(&self.path)
            .with_context(|| format!("Failed to write font: {}", self.path.display()))?;
        Ok(())
    }

    /// Save `font` as a UFO directory, replacing any previous one only after
    /// the new one is fully written.
    pub fn write_ufo(&self, font: &Font) -> Result<()> {
        self.ensure_parent_dir()?;
        let tmp = Builder::new()
            .prefix(".fontbuild")
            .tempdir_in(self.parent())
            .with_context(|| format!("Failed to create temporary directory for: {}", self.path.display()))?;
        let staged = tmp.path().join("font.ufo");
        save_ufo(font, &staged)
            .with_context(|| format!("Failed to save UFO: {}", self.path.display()))?;

        if self.path.exists() {
            remove_dir_all(&self.path)
                .with_context(|| format!("Failed to replace UFO: {}", self.path.display()))?;
        }
        rename(&staged, &self.path)
            .with_context(|| format!("Failed to move UFO into place: {}", self.path.display()))
    }

    pub fn ensure_parent_dir(&self) -> Result<()> {
        let parent = self.parent();
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        Ok(())
    }

    fn parent(&self) -> &Path {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        }
    }
}

impl AsRef<Path> for FontFile {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

/// `<build_root>/<Family><EXT>/<Family>-<Style>.<ext>`, with spaces removed
/// from family and style.
pub fn output_path(build_root: &Path, font: &Font, ext: &str) -> Result<PathBuf> {
    let family = font.info.family_name.as_deref().context("Font has no family name")?;
    let style = font.info.style_name.as_deref().context("Font has no style name")?;
    let family = family.replace(' ', "");
    let style = style.replace(' ', "");
    Ok(build_root
        .join(format!("{family}{}", ext.to_uppercase()))
        .join(format!("{family}-{style}.{ext}")))
}

/// Build directory for a base UFO: `build_dir` resolved against the
/// directory holding the UFO.
pub fn build_root(base_ufo: &Path, build_dir: &Path) -> PathBuf {
    base_ufo.parent().unwrap_or(Path::new("")).join(build_dir)
}

/// Remove a build directory. Returns whether anything was removed.
pub fn clean(dir: &Path) -> Result<bool> {
    if !dir.exists() {
        return Ok(false);
    }
    remove_dir_all(dir)
        .with_context(|| format!("Failed to remove build directory: {}", dir.display()))?;
    Ok(true)
}
