//! Contour normalization used as the built-in overlap resolver.

use fontbuild_font_model::Contour;
use kurbo::{BezPath, Shape};
use log::debug;

use crate::{clean::OverlapResolver, error::Result};

const AREA_EPSILON: f64 = 1e-6;

/// Canonicalizes a glyph's contour set without computing a true boolean
/// union.
///
/// Degenerate contours (fewer than two on-curve points, or no area) and
/// contours whose point set duplicates an earlier one are dropped. The rest
/// are oriented by nesting depth: outermost counter-clockwise, holes
/// clockwise, alternating inward. Open contours pass through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContourNormalizer;

impl OverlapResolver for ContourNormalizer {
    fn union(&self, contours: &[Contour]) -> Result<Vec<Contour>> {
        let mut kept: Vec<Contour> = Vec::with_capacity(contours.len());
        let mut seen: Vec<Vec<(u64, u64)>> = Vec::with_capacity(contours.len());

        for contour in contours {
            if contour.is_closed() && is_degenerate(contour) {
                debug!("Dropping degenerate contour with {} points", contour.len());
                continue;
            }
            let key = point_set(contour);
            if seen.contains(&key) {
                debug!("Dropping duplicate contour with {} points", contour.len());
                continue;
            }
            seen.push(key);
            kept.push(contour.clone());
        }

        let paths: Vec<Option<BezPath>> = kept
            .iter()
            .map(|c| c.is_closed().then(|| c.to_bezpath()))
            .collect();

        for i in 0..kept.len() {
            let Some(path) = &paths[i] else { continue };
            let Some(probe) = kept[i].points.iter().find(|p| p.typ.is_on_curve()) else {
                continue;
            };
            let probe = probe.point();
            let depth = paths
                .iter()
                .enumerate()
                .filter(|(j, other)| *j != i && other.as_ref().is_some_and(|o| o.winding(probe) != 0))
                .count();

            let counter_clockwise = path.area() > 0.0;
            if counter_clockwise != (depth % 2 == 0) {
                kept[i].reverse();
            }
        }

        Ok(kept)
    }
}

fn is_degenerate(contour: &Contour) -> bool {
    contour.on_curve_count() < 2 || contour.to_bezpath().area().abs() < AREA_EPSILON
}

/// Sorted coordinates of every point, independent of start index and
/// direction.
fn point_set(contour: &Contour) -> Vec<(u64, u64)> {
    // Adding zero folds -0.0 into 0.0.
    let mut key: Vec<(u64, u64)> = contour
        .points
        .iter()
        .map(|p| ((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits()))
        .collect();
    key.sort_unstable();
    key
}
