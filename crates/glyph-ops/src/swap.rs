use std::mem;

use fontbuild_font_model::Font;
use log::{debug, warn};

/// Exchange the contours and advance widths of glyphs `a` and `b`.
///
/// Returns `false` without touching the font when either glyph is missing
/// (or when both names are the same).
pub fn swap_contours(font: &mut Font, a: &str, b: &str) -> bool {
    let Some((first, second)) = font.glyph_pair_mut(a, b) else {
        warn!("Contour swap failed for '{a}' and '{b}'");
        return false;
    };

    mem::swap(&mut first.contours, &mut second.contours);
    mem::swap(&mut first.width, &mut second.width);
    true
}

/// Swap every glyph ending in `suffix` with its unsuffixed counterpart.
///
/// Returns the number of pairs swapped.
pub fn swap_suffixed(font: &mut Font, suffix: &str) -> usize {
    if suffix.is_empty() {
        return 0;
    }

    let pairs: Vec<(String, String)> = font
        .names()
        .into_iter()
        .filter_map(|name| {
            let base = name.strip_suffix(suffix)?.to_string();
            Some((base, name))
        })
        .collect();

    let mut swapped = 0;
    for (base, name) in &pairs {
        debug!("Swapping {base} <-> {name}");
        if swap_contours(font, base, name) {
            swapped += 1;
        }
    }
    swapped
}

#[cfg(test)]
mod tests {
    use fontbuild_font_model::{Contour, ContourPoint, Glyph};

    use super::*;

    fn bar(x: f64) -> Contour {
        Contour::new(vec![
            ContourPoint::line(x, 0.0),
            ContourPoint::line(x + 10.0, 0.0),
            ContourPoint::line(x + 10.0, 100.0),
        ])
    }

    fn font() -> Font {
        [
            Glyph::new("a").with_width(500.0).with_contour(bar(0.0)),
            Glyph::new("a.alt").with_width(520.0).with_contour(bar(5.0)).with_contour(bar(50.0)),
            Glyph::new("g.alt").with_width(480.0).with_contour(bar(7.0)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_swap_exchanges_contours_and_width() {
        let mut font = font();
        assert!(swap_contours(&mut font, "a", "a.alt"));

        let a = font.glyph("a").unwrap();
        assert_eq!(a.width, 520.0);
        assert_eq!(a.contours, vec![bar(5.0), bar(50.0)]);
        assert_eq!(font.glyph("a.alt").unwrap().contours, vec![bar(0.0)]);
    }

    #[test]
    fn test_swap_twice_restores() {
        let original = font();
        let mut font = original.clone();
        swap_contours(&mut font, "a", "a.alt");
        swap_contours(&mut font, "a", "a.alt");
        assert_eq!(font, original);
    }

    #[test]
    fn test_swap_missing_glyph_is_a_no_op() {
        let original = font();
        let mut font = original.clone();
        assert!(!swap_contours(&mut font, "g", "g.alt"));
        assert_eq!(font, original);
    }

    #[test]
    fn test_swap_suffixed() {
        let mut font = font();
        assert_eq!(swap_suffixed(&mut font, ".alt"), 1);
        assert_eq!(font.glyph("a").unwrap().width, 520.0);
        assert_eq!(font.glyph("g.alt").unwrap().width, 480.0);
    }
}
