//! Composite glyph generation from the diacritic rule list.

use anyhow::{Context, Result};
use fontbuild_font_model::Font;
use fontbuild_glyph_ops::{CodepointMap, GlyphGenerator};
use log::debug;

/// Run `generator` for every rule in `glyph_names`, in order.
///
/// Blank entries and `#` comments are skipped. Returns the number of rules
/// handed to the generator.
pub fn generate_glyphs<S: AsRef<str>>(
    font: &mut Font,
    glyph_names: &[S],
    mapping: &CodepointMap,
    generator: &dyn GlyphGenerator,
) -> Result<usize> {
    let rules = glyph_names
        .iter()
        .map(|n| n.as_ref().trim())
        .filter(|n| !n.is_empty() && !n.starts_with('#'));

    let mut count = 0;
    for rule in rules {
        generator
            .generate(font, rule, mapping)
            .with_context(|| format!("Failed to generate glyph from rule '{rule}'"))?;
        count += 1;
    }
    debug!("Processed {count} glyph rules");
    Ok(count)
}
