//! Whole-font cleanup passes: overlap removal, deletion and decomposition.

use fontbuild_font_model::{Contour, Font, Glyph};
use log::debug;

use crate::error::{Error, Result};

/// Boolean union of a glyph's contours.
pub trait OverlapResolver: Send + Sync {
    /// Return canonical, non-overlapping contours covering `contours`.
    fn union(&self, contours: &[Contour]) -> Result<Vec<Contour>>;
}

/// Replaces the components of one glyph with outlines.
pub trait Decomposer: Send + Sync {
    fn decompose(&self, font: &mut Font, name: &str) -> Result<()>;
}

/// Replace the contours of `glyph` with their union.
///
/// On failure the glyph keeps its original contours.
pub fn remove_glyph_overlap(glyph: &mut Glyph, resolver: &dyn OverlapResolver) -> Result<()> {
    if glyph.contours.is_empty() {
        return Ok(());
    }

    let contours = resolver.union(&glyph.contours).map_err(|e| Error::Overlap {
        glyph: glyph.name.clone(),
        message: e.to_string(),
    })?;
    glyph.contours = contours;
    Ok(())
}

/// Remove overlaps from every glyph that has contours.
pub fn remove_overlaps(font: &mut Font, resolver: &dyn OverlapResolver) -> Result<()> {
    for glyph in font.iter_mut() {
        remove_glyph_overlap(glyph, resolver)?;
    }
    Ok(())
}

/// Delete the named glyphs, skipping names that are not in the font.
///
/// Returns the number of glyphs removed.
pub fn delete_glyphs<S: AsRef<str>>(font: &mut Font, names: &[S]) -> usize {
    names
        .iter()
        .filter(|name| font.remove(name.as_ref()).is_some())
        .count()
}

/// Decompose the named glyphs, skipping names that are not in the font and
/// glyphs without components.
pub fn decompose_glyphs<S: AsRef<str>>(
    font: &mut Font,
    names: &[S],
    decomposer: &dyn Decomposer,
) -> Result<()> {
    for name in names {
        let name = name.as_ref();
        if !font.glyph(name).is_some_and(Glyph::has_components) {
            continue;
        }
        debug!("Decomposing {name}");
        decomposer.decompose(font, name)?;
    }
    Ok(())
}
