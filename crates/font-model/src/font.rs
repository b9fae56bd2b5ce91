use std::collections::BTreeMap;

use norad::FontInfo;

use crate::glyph::Glyph;

const DEFAULT_UNITS_PER_EM: f64 = 1000.0;

/// A font: glyphs keyed by name, plus UFO font info and feature text.
///
/// Glyph names are unique; inserting a glyph whose name is already present
/// replaces the old glyph.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Font {
    pub info: FontInfo,
    pub features: String,
    glyphs: BTreeMap<String, Glyph>,
}

impl Font {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.glyphs.contains_key(name)
    }

    pub fn glyph(&self, name: &str) -> Option<&Glyph> {
        self.glyphs.get(name)
    }

    pub fn glyph_mut(&mut self, name: &str) -> Option<&mut Glyph> {
        self.glyphs.get_mut(name)
    }

    /// Insert a glyph, returning the glyph it replaced.
    pub fn insert(&mut self, glyph: Glyph) -> Option<Glyph> {
        self.glyphs.insert(glyph.name.clone(), glyph)
    }

    pub fn remove(&mut self, name: &str) -> Option<Glyph> {
        self.glyphs.remove(name)
    }

    /// Glyphs in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Glyph> {
        self.glyphs.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Glyph> {
        self.glyphs.values_mut()
    }

    /// Glyph names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.glyphs.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Units per em from font info, 1000 when unset.
    pub fn units_per_em(&self) -> f64 {
        self.info
            .units_per_em
            .map(|v| v.to_string().parse().unwrap_or(DEFAULT_UNITS_PER_EM))
            .unwrap_or(DEFAULT_UNITS_PER_EM)
    }

    /// Mutable access to two distinct glyphs at once.
    ///
    /// Returns `None` if either glyph is missing or both names are equal.
    pub fn glyph_pair_mut(&mut self, a: &str, b: &str) -> Option<(&mut Glyph, &mut Glyph)> {
        if a == b || !self.contains(a) || !self.contains(b) {
            return None;
        }
        let mut first = None;
        let mut second = None;
        for (name, glyph) in self.glyphs.iter_mut() {
            if name == a {
                first = Some(glyph);
            } else if name == b {
                second = Some(glyph);
            }
        }
        first.zip(second)
    }
}

impl FromIterator<Glyph> for Font {
    fn from_iter<I: IntoIterator<Item = Glyph>>(iter: I) -> Self {
        let mut font = Font::new();
        for glyph in iter {
            font.insert(glyph);
        }
        font
    }
}
