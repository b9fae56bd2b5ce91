//! Affine transforms applied to whole glyphs.

use fontbuild_font_model::Glyph;
use kurbo::{Affine, Point, Vec2};

/// Apply `m` to a glyph in place.
///
/// The advance width is scaled by the x-scale of `m` and rounded, unless the
/// x-scale is exactly 1. Contour points and anchors are mapped through `m`.
/// Component deltas are re-derived with [`component_delta`] from the UFO
/// origin, and component scales are conjugated by the linear part of `m`
/// when it is invertible.
pub fn transform_glyph(glyph: &mut Glyph, m: Affine) {
    let [xx, ..] = m.as_coeffs();
    if xx != 1.0 {
        glyph.width = (glyph.width * xx).round();
    }

    for contour in &mut glyph.contours {
        contour.apply(m);
    }
    for anchor in &mut glyph.anchors {
        anchor.set_point(m * anchor.point());
    }

    let linear = m.with_translation(Vec2::ZERO);
    let conjugate = (linear != Affine::IDENTITY && linear.determinant() != 0.0)
        .then(|| (linear, linear.inverse()));

    for component in &mut glyph.components {
        let delta = component_delta(m, Point::ORIGIN, component.delta());
        if let Some((forward, inverse)) = conjugate {
            component.transform = forward * component.linear() * inverse;
        }
        component.set_delta(delta);
    }
}

/// Delta of a component after its parent is transformed by `m`.
///
/// Both the origin and the offset point are transformed and the difference
/// taken, so translations in `m` cancel out.
pub fn component_delta(m: Affine, origin: Point, delta: Vec2) -> Vec2 {
    (m * (origin + delta)) - (m * origin)
}
