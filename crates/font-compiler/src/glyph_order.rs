use fontbuild_font_model::Font;
use indexmap::IndexSet;

pub const NOTDEF: &str = ".notdef";

/// Final glyph order for `font`.
///
/// `.notdef` comes first, then every name of `configured` that exists in
/// the font, then the remaining glyphs sorted by name. `.notdef` is listed
/// even when the font lacks it.
pub fn resolve_glyph_order<S: AsRef<str>>(font: &Font, configured: &[S]) -> Vec<String> {
    let mut order: IndexSet<String> = IndexSet::with_capacity(font.len() + 1);
    order.insert(NOTDEF.to_string());

    for name in configured {
        let name = name.as_ref().trim();
        if font.contains(name) {
            order.insert(name.to_string());
        }
    }
    // Font names iterate sorted.
    order.extend(font.names());

    order.into_iter().collect()
}
