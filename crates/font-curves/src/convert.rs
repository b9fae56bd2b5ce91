use std::collections::{BTreeMap, BTreeSet};

use fontbuild_font_model::{Contour, ContourPoint, Font, Glyph, PointType};
use kurbo::{CubicBez, Point, cubics_to_quadratic_splines};
use log::{debug, info, warn};
use rayon::prelude::*;

use crate::error::{Error, Result};

/// Converts the curves of a set of fonts to quadratic form.
pub trait CurveConverter: Send + Sync {
    /// Convert every cubic segment in `fonts`.
    ///
    /// Glyphs sharing a name are converted together, so each of them ends
    /// up with the same number of points. `max_err_em` is the tolerance as a
    /// fraction of units per em. With `reverse_direction`, every contour is
    /// reversed afterwards.
    fn to_quadratic(&self, fonts: &mut [Font], max_err_em: f64, reverse_direction: bool)
    -> Result<()>;
}

/// Built-in converter using kurbo's joint spline approximation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SplineConverter;

/// New contours for one glyph name, per font index.
struct GlyphPlan {
    name: String,
    contours: Vec<(usize, Vec<Contour>)>,
    /// Off-curve point count of every converted segment.
    segments: Vec<usize>,
}

enum Issue {
    Incompatible(String),
    Approximation,
    Unsupported(String),
}

impl CurveConverter for SplineConverter {
    fn to_quadratic(
        &self,
        fonts: &mut [Font],
        max_err_em: f64,
        reverse_direction: bool,
    ) -> Result<()> {
        let max_err = fonts
            .iter()
            .map(|f| max_err_em * f.units_per_em())
            .fold(f64::INFINITY, f64::min);
        let names: BTreeSet<String> = fonts.iter().flat_map(Font::names).collect();

        let shared: &[Font] = fonts;
        let results: Vec<(String, std::result::Result<Option<GlyphPlan>, Issue>)> = names
            .into_par_iter()
            .map(|name| {
                let result = plan_glyph(shared, &name, max_err);
                (name, result)
            })
            .collect();

        let mut plans = Vec::new();
        let mut incompatible = Vec::new();
        for (name, result) in results {
            match result {
                Ok(Some(plan)) => plans.push(plan),
                Ok(None) => {}
                Err(Issue::Incompatible(reason)) => {
                    warn!("Glyph '{name}' is incompatible: {reason}");
                    incompatible.push(name);
                }
                Err(Issue::Approximation) => return Err(Error::Approximation { glyph: name, max_err }),
                Err(Issue::Unsupported(message)) => return Err(Error::Unsupported { glyph: name, message }),
            }
        }
        if !incompatible.is_empty() {
            return Err(Error::Incompatible { glyphs: incompatible });
        }

        let mut histogram: BTreeMap<usize, usize> = BTreeMap::new();
        for plan in plans {
            for count in &plan.segments {
                *histogram.entry(*count).or_default() += 1;
            }
            for (index, contours) in plan.contours {
                if let Some(glyph) = fonts[index].glyph_mut(&plan.name) {
                    glyph.contours = contours;
                }
            }
        }

        if reverse_direction {
            for glyph in fonts.iter_mut().flat_map(Font::iter_mut) {
                glyph.contours.iter_mut().for_each(Contour::reverse);
            }
        }

        let total: usize = histogram.values().sum();
        info!("Converted {total} curves in {} fonts (max error {max_err:.3} units)", fonts.len());
        for (offs, count) in &histogram {
            debug!("  {offs} off-curve points: {count} segments");
        }
        Ok(())
    }
}

fn plan_glyph(fonts: &[Font], name: &str, max_err: f64) -> std::result::Result<Option<GlyphPlan>, Issue> {
    let (indices, glyphs): (Vec<usize>, Vec<&Glyph>) = fonts
        .iter()
        .enumerate()
        .filter_map(|(i, f)| f.glyph(name).map(|g| (i, g)))
        .unzip();

    if !glyphs.iter().any(|g| g.contours.iter().any(Contour::has_cubic)) {
        return Ok(None);
    }

    let contour_count = glyphs[0].contours.len();
    if glyphs.iter().any(|g| g.contours.len() != contour_count) {
        return Err(Issue::Incompatible("contour counts differ".to_string()));
    }

    let mut converted: Vec<Vec<Contour>> = vec![Vec::with_capacity(contour_count); glyphs.len()];
    let mut segments = Vec::new();
    for c in 0..contour_count {
        let contours: Vec<&Contour> = glyphs.iter().map(|g| &g.contours[c]).collect();
        let reference = contours[0];
        let same_structure = contours.iter().all(|other| {
            other.len() == reference.len()
                && other.points.iter().zip(&reference.points).all(|(a, b)| a.typ == b.typ)
        });
        if !same_structure {
            return Err(Issue::Incompatible(format!("contour {c} has different point types")));
        }

        for (out, contour) in converted.iter_mut().zip(convert_contours(&contours, max_err, &mut segments)?) {
            out.push(contour);
        }
    }

    Ok(Some(GlyphPlan {
        name: name.to_string(),
        contours: indices.into_iter().zip(converted).collect(),
        segments,
    }))
}

/// Convert structurally identical contours together.
fn convert_contours(
    contours: &[&Contour],
    max_err: f64,
    segments: &mut Vec<usize>,
) -> std::result::Result<Vec<Contour>, Issue> {
    let reference = contours[0];
    let n = reference.len();
    let closed = reference.is_closed();
    let prev = |i: usize| -> Option<usize> {
        match i {
            0 if closed => Some(n - 1),
            0 => None,
            _ => Some(i - 1),
        }
    };

    let mut outputs: Vec<Vec<ContourPoint>> = vec![Vec::with_capacity(n); contours.len()];
    let mut consumed = vec![false; n];
    // Points to emit right before each curve end, per font.
    let mut inserts: BTreeMap<usize, Vec<Vec<Point>>> = BTreeMap::new();
    let mut types = reference.points.iter().map(|p| p.typ).collect::<Vec<_>>();

    for end in 0..n {
        if reference.points[end].typ != PointType::Curve {
            continue;
        }
        let mut offs = Vec::new();
        let mut cursor = prev(end);
        while let Some(i) = cursor {
            if i == end || reference.points[i].typ != PointType::OffCurve {
                break;
            }
            offs.push(i);
            cursor = prev(i);
        }
        offs.reverse();

        match offs.len() {
            0 => types[end] = PointType::Line,
            1 => types[end] = PointType::QCurve,
            2 => {
                // `start == end` when the curve is the contour's only segment.
                let Some(start) = cursor else {
                    return Err(Issue::Unsupported("cubic without start point".to_string()));
                };
                let cubics: Vec<CubicBez> = contours
                    .iter()
                    .map(|c| {
                        CubicBez::new(
                            c.points[start].point(),
                            c.points[offs[0]].point(),
                            c.points[offs[1]].point(),
                            c.points[end].point(),
                        )
                    })
                    .collect();
                let splines =
                    cubics_to_quadratic_splines(&cubics, max_err).ok_or(Issue::Approximation)?;

                let quad_offs: Vec<Vec<Point>> = splines
                    .iter()
                    .map(|s| {
                        let points = s.points();
                        points[1..points.len() - 1].to_vec()
                    })
                    .collect();
                segments.push(quad_offs[0].len());
                for &i in &offs {
                    consumed[i] = true;
                }
                inserts.insert(end, quad_offs);
                types[end] = PointType::QCurve;
            }
            k => return Err(Issue::Unsupported(format!("curve with {k} off-curve points"))),
        }
    }

    for (f, contour) in contours.iter().enumerate() {
        let out = &mut outputs[f];
        for (i, point) in contour.points.iter().enumerate() {
            if consumed[i] {
                continue;
            }
            if let Some(offs) = inserts.get(&i) {
                out.extend(offs[f].iter().map(|p| ContourPoint::off(p.x, p.y)));
            }
            out.push(ContourPoint { typ: types[i], ..point.clone() });
        }
    }

    Ok(outputs.into_iter().map(Contour::new).collect())
}
