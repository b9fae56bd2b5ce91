//! Two-master interpolation.

use std::path::Path;

use anyhow::{Context, Result};
use fontbuild_font_model::{Anchor, Component, Contour, ContourPoint, Font, Glyph, load_ufo};
use kurbo::{Affine, Point};
use log::debug;

/// Produces an instance font from the base font.
pub trait MasterMixer: Send + Sync {
    /// The base font decides which glyphs the result has.
    fn mix(&self, base: &Font) -> Result<Font>;
}

/// Linear interpolation between two masters, with separate x and y
/// factors.
///
/// A factor of 0 gives the first master, 1 the second. Glyphs missing from
/// either master or with incompatible structure are copied from the base
/// font unchanged.
#[derive(Debug, Clone)]
pub struct LinearMix {
    masters: [Font; 2],
    factor: (f64, f64),
}

impl LinearMix {
    pub fn new(a: Font, b: Font, factor: (f64, f64)) -> Self {
        Self { masters: [a, b], factor }
    }

    pub fn load(a: impl AsRef<Path>, b: impl AsRef<Path>, factor: (f64, f64)) -> Result<Self> {
        let load = |path: &Path| {
            load_ufo(path).with_context(|| format!("Failed to load master: {}", path.display()))
        };
        Ok(Self::new(load(a.as_ref())?, load(b.as_ref())?, factor))
    }

    fn lerp(&self, a: Point, b: Point) -> Point {
        let (fx, fy) = self.factor;
        Point::new(a.x + (b.x - a.x) * fx, a.y + (b.y - a.y) * fy)
    }

    /// Interpolate one glyph, or `None` when the masters don't match.
    fn mix_glyph(&self, base: &Glyph) -> Option<Glyph> {
        let [a, b] = &self.masters;
        let (a, b) = (a.glyph(&base.name)?, b.glyph(&base.name)?);
        if !compatible(a, b) {
            debug!("Glyph '{}' is not compatible between masters", base.name);
            return None;
        }

        let contours = a
            .contours
            .iter()
            .zip(&b.contours)
            .map(|(ca, cb)| {
                let points = ca
                    .points
                    .iter()
                    .zip(&cb.points)
                    .map(|(pa, pb)| {
                        let p = self.lerp(pa.point(), pb.point());
                        ContourPoint { x: p.x, y: p.y, ..pa.clone() }
                    })
                    .collect();
                Contour::new(points)
            })
            .collect();

        let components = a
            .components
            .iter()
            .zip(&b.components)
            .map(|(ca, cb)| {
                let (ta, tb) = (ca.transform.as_coeffs(), cb.transform.as_coeffs());
                let (fx, _) = self.factor;
                let mut coeffs: [f64; 6] = std::array::from_fn(|i| ta[i] + (tb[i] - ta[i]) * fx);
                let offset = self.lerp(Point::new(ta[4], ta[5]), Point::new(tb[4], tb[5]));
                coeffs[4] = offset.x;
                coeffs[5] = offset.y;
                Component::new(ca.base.clone(), Affine::new(coeffs))
            })
            .collect();

        let anchors = a
            .anchors
            .iter()
            .filter_map(|aa| {
                let name = aa.name.as_deref()?;
                let ab = b.anchor(name)?;
                let p = self.lerp(aa.point(), ab.point());
                Some(Anchor::new(name, p.x, p.y))
            })
            .collect();

        let (fx, _) = self.factor;
        Some(Glyph {
            name: base.name.clone(),
            width: a.width + (b.width - a.width) * fx,
            codepoints: base.codepoints.clone(),
            contours,
            anchors,
            components,
        })
    }
}

fn compatible(a: &Glyph, b: &Glyph) -> bool {
    a.contours.len() == b.contours.len()
        && a.contours.iter().zip(&b.contours).all(|(ca, cb)| {
            ca.len() == cb.len() && ca.points.iter().zip(&cb.points).all(|(p, q)| p.typ == q.typ)
        })
        && a.components.len() == b.components.len()
        && a.components.iter().zip(&b.components).all(|(p, q)| p.base == q.base)
}

impl MasterMixer for LinearMix {
    fn mix(&self, base: &Font) -> Result<Font> {
        let mut font = base.clone();
        let mut mixed = 0;
        for glyph in font.iter_mut() {
            if let Some(g) = self.mix_glyph(glyph) {
                *glyph = g;
                mixed += 1;
            }
        }
        debug!("Interpolated {mixed} of {} glyphs", font.len());
        Ok(font)
    }
}
