//! Composite glyph synthesis from declarative rules.
//!
//! A rule has the form
//!
//! ```text
//! base+accent:anchor+accent2:anchor2=glyphName/leftOffset,rightOffset
//! ```
//!
//! where the accents and the `/offsets` part are optional. A base made of
//! `_`-joined names (`f_i`) builds a ligature from its parts instead.

use std::{collections::HashMap, str::FromStr};

use fontbuild_font_model::{Anchor, Component, Font, Glyph};
use kurbo::{Point, Vec2};
use log::{debug, warn};

use crate::error::{Error, Result};

/// Glyph name to Unicode codepoint table.
pub type CodepointMap = HashMap<String, char>;

/// Builds one glyph into a font from a rule.
pub trait GlyphGenerator: Send + Sync {
    /// Add the glyph described by `rule` to `font`. Missing inputs are handled
    /// by the generator's own policy.
    fn generate(&self, font: &mut Font, rule: &str, mapping: &CodepointMap) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccentRef {
    pub glyph: String,
    pub anchor: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositeRule {
    pub name: String,
    pub base: String,
    pub accents: Vec<AccentRef>,
    pub left: f64,
    pub right: f64,
}

impl CompositeRule {
    pub fn is_ligature(&self) -> bool {
        self.base.contains('_')
    }
}

impl FromStr for CompositeRule {
    type Err = Error;

    fn from_str(rule: &str) -> Result<Self> {
        let invalid = |message: &str| Error::InvalidRule {
            rule: rule.to_string(),
            message: message.to_string(),
        };

        let (parts, target) = rule.trim().split_once('=').ok_or_else(|| invalid("missing '='"))?;
        let (name, offsets) = match target.split_once('/') {
            Some((name, offsets)) => (name, Some(offsets)),
            None => (target, None),
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(invalid("missing glyph name"));
        }

        let (left, right) = match offsets {
            None => (0.0, 0.0),
            Some(offsets) => {
                let (left, right) = offsets
                    .split_once(',')
                    .ok_or_else(|| invalid("offsets must be 'left,right'"))?;
                let left = left.trim().parse::<f64>().map_err(|_| invalid("bad left offset"))?;
                let right = right.trim().parse::<f64>().map_err(|_| invalid("bad right offset"))?;
                (left, right)
            }
        };

        let mut pieces = parts.split('+').map(str::trim);
        let base = pieces
            .next()
            .filter(|b| !b.is_empty())
            .ok_or_else(|| invalid("missing base glyph"))?;
        let accents = pieces
            .map(|accent| {
                let (glyph, anchor) = accent
                    .split_once(':')
                    .ok_or_else(|| invalid("accent must be 'glyph:anchor'"))?;
                Ok(AccentRef { glyph: glyph.to_string(), anchor: anchor.to_string() })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: name.to_string(),
            base: base.to_string(),
            accents,
            left,
            right,
        })
    }
}

/// Codepoint for a glyph name: from `mapping`, or parsed from a `uniXXXX` or
/// `uXXXXX` name.
pub fn codepoint_for(name: &str, mapping: &CodepointMap) -> Option<char> {
    if let Some(c) = mapping.get(name) {
        return Some(*c);
    }
    let hex = match name.strip_prefix("uni") {
        Some(hex) if hex.len() == 4 => hex,
        _ => name.strip_prefix('u').filter(|hex| (4..=6).contains(&hex.len()))?,
    };
    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}

/// Built-in generator for composite rules.
///
/// Accents are placed so that their `_anchor` lands on the base glyph's
/// `anchor`, or on the previous accent's `anchor` when accents stack.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompositeRuleGenerator;

impl GlyphGenerator for CompositeRuleGenerator {
    fn generate(&self, font: &mut Font, rule: &str, mapping: &CodepointMap) -> Result<()> {
        let rule: CompositeRule = rule.parse()?;
        if font.contains(&rule.name) {
            debug!("Glyph '{}' already exists, skipping composition rule", rule.name);
            return Ok(());
        }

        let glyph = if rule.is_ligature() {
            build_ligature(font, &rule)
        } else {
            build_composite(font, &rule)
        };

        if let Some(mut glyph) = glyph {
            if let Some(codepoint) = codepoint_for(&glyph.name, mapping) {
                glyph.codepoints = vec![codepoint];
            }
            font.insert(glyph);
        }
        Ok(())
    }
}

fn build_ligature(font: &Font, rule: &CompositeRule) -> Option<Glyph> {
    let mut glyph = Glyph::new(&rule.name);
    for part in rule.base.split('_') {
        let Some(source) = font.glyph(part) else {
            warn!("Ligature part '{part}' not found for '{}'", rule.name);
            return None;
        };
        glyph.components.push(Component::at(part, glyph.width, 0.0));
        glyph.width += source.width;
    }
    Some(glyph)
}

fn build_composite(font: &Font, rule: &CompositeRule) -> Option<Glyph> {
    let Some(base) = font.glyph(&rule.base) else {
        warn!("Base glyph '{}' not found for '{}'", rule.base, rule.name);
        return None;
    };

    let mut glyph = Glyph::new(&rule.name).with_width(base.width + rule.left + rule.right);
    glyph.components.push(Component::at(&rule.base, 0.0, 0.0));

    // Attachment points placed so far, keyed by anchor name.
    let mut stacked: HashMap<&str, Point> = HashMap::new();
    for accent in &rule.accents {
        let target = match stacked.get(accent.anchor.as_str()) {
            Some(point) => *point,
            None => match base.anchor(&accent.anchor) {
                Some(anchor) => anchor.point(),
                None => {
                    warn!("Anchor '{}' not found in '{}' for '{}'", accent.anchor, rule.base, rule.name);
                    return None;
                }
            },
        };

        let Some(mark) = font.glyph(&accent.glyph) else {
            warn!("Accent '{}' not found for '{}'", accent.glyph, rule.name);
            return None;
        };
        let attach = format!("_{}", accent.anchor);
        let Some(mark_anchor) = mark.anchor(&attach) else {
            warn!("Anchor '{attach}' not found in '{}' for '{}'", accent.glyph, rule.name);
            return None;
        };

        let offset = target - mark_anchor.point();
        glyph.components.push(Component::at(&accent.glyph, offset.x, offset.y));
        if let Some(next) = mark.anchor(&accent.anchor) {
            stacked.insert(accent.anchor.as_str(), next.point() + offset);
        }
    }

    let shift = Vec2::new(rule.left, 0.0);
    for component in &mut glyph.components {
        component.set_delta(component.delta() + shift);
    }
    glyph.anchors = base
        .anchors
        .iter()
        .filter(|a| a.name.as_deref().is_some_and(|n| !n.starts_with('_')))
        .map(|a| Anchor { name: a.name.clone(), x: a.x + rule.left, y: a.y })
        .collect();

    Some(glyph)
}
