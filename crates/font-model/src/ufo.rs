//! Conversion between the font model and UFO sources.

use std::path::Path;

use kurbo::Affine;
use log::debug;

use crate::{
    error::{Error, Result},
    font::Font,
    glyph::{Anchor, Component, Contour, ContourPoint, Glyph, PointType},
};

/// Load the default layer of a UFO.
pub fn load_ufo(path: impl AsRef<Path>) -> Result<Font> {
    let path = path.as_ref();
    let ufo = norad::Font::load(path).map_err(|e| Error::Load {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut font = Font::new();
    font.info = ufo.font_info.clone();
    font.features = ufo.features.clone();
    for glyph in ufo.default_layer().iter() {
        font.insert(glyph_from_norad(glyph));
    }

    debug!("Loaded {} glyphs from {}", font.len(), path.display());
    Ok(font)
}

/// Write a font as a UFO, replacing anything already at `path`.
pub fn save_ufo(font: &Font, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut ufo = norad::Font::new();
    ufo.font_info = font.info.clone();
    ufo.features = font.features.clone();

    let layer = ufo.default_layer_mut();
    for glyph in font.iter() {
        layer.insert_glyph(glyph_to_norad(glyph)?);
    }

    ufo.save(path).map_err(|e| Error::Save {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn glyph_from_norad(glyph: &norad::Glyph) -> Glyph {
    Glyph {
        name: glyph.name().to_string(),
        width: glyph.width,
        codepoints: glyph.codepoints.iter().collect(),
        contours: glyph.contours.iter().map(contour_from_norad).collect(),
        anchors: glyph
            .anchors
            .iter()
            .map(|a| Anchor {
                name: a.name.as_ref().map(|n| n.to_string()),
                x: a.x,
                y: a.y,
            })
            .collect(),
        components: glyph
            .components
            .iter()
            .map(|c| {
                let t = &c.transform;
                Component::new(
                    c.base.to_string(),
                    Affine::new([
                        t.x_scale, t.xy_scale, t.yx_scale, t.y_scale, t.x_offset, t.y_offset,
                    ]),
                )
            })
            .collect(),
    }
}

fn contour_from_norad(contour: &norad::Contour) -> Contour {
    Contour::new(
        contour
            .points
            .iter()
            .map(|p| ContourPoint {
                x: p.x,
                y: p.y,
                typ: point_type_from_norad(&p.typ),
                smooth: p.smooth,
                name: p.name.as_ref().map(|n| n.to_string()),
            })
            .collect(),
    )
}

fn glyph_to_norad(glyph: &Glyph) -> Result<norad::Glyph> {
    let mut out = norad::Glyph::new(&glyph.name);
    out.width = glyph.width;
    for codepoint in &glyph.codepoints {
        out.codepoints.insert(*codepoint);
    }

    for contour in &glyph.contours {
        let points = contour
            .points
            .iter()
            .map(|p| {
                Ok(norad::ContourPoint::new(
                    p.x,
                    p.y,
                    point_type_to_norad(p.typ),
                    p.smooth,
                    p.name.as_deref().map(parse_name).transpose()?,
                    None,
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        out.contours.push(norad::Contour::new(points, None));
    }

    for anchor in &glyph.anchors {
        let name = anchor.name.as_deref().map(parse_name).transpose()?;
        out.anchors.push(norad::Anchor::new(anchor.x, anchor.y, name, None, None));
    }

    for component in &glyph.components {
        let [x_scale, xy_scale, yx_scale, y_scale, x_offset, y_offset] =
            component.transform.as_coeffs();
        let transform = norad::AffineTransform {
            x_scale,
            xy_scale,
            yx_scale,
            y_scale,
            x_offset,
            y_offset,
        };
        out.components
            .push(norad::Component::new(parse_name(&component.base)?, transform, None));
    }

    Ok(out)
}

fn parse_name(name: &str) -> Result<norad::Name> {
    name.parse().map_err(|_| Error::InvalidName(name.to_string()))
}

fn point_type_from_norad(typ: &norad::PointType) -> PointType {
    match typ {
        norad::PointType::Move => PointType::Move,
        norad::PointType::Line => PointType::Line,
        norad::PointType::OffCurve => PointType::OffCurve,
        norad::PointType::Curve => PointType::Curve,
        norad::PointType::QCurve => PointType::QCurve,
    }
}

fn point_type_to_norad(typ: PointType) -> norad::PointType {
    match typ {
        PointType::Move => norad::PointType::Move,
        PointType::Line => norad::PointType::Line,
        PointType::OffCurve => norad::PointType::OffCurve,
        PointType::Curve => norad::PointType::Curve,
        PointType::QCurve => norad::PointType::QCurve,
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn sample_font() -> Font {
        let mut font = Font::new();
        font.info.family_name = Some("Test Sans".to_string());
        font.features = "languagesystem DFLT dflt;\n".to_string();
        font.insert(
            Glyph::new("A")
                .with_width(600.0)
                .with_codepoint('A')
                .with_contour(Contour::new(vec![
                    ContourPoint::line(0.0, 0.0),
                    ContourPoint::line(600.0, 0.0),
                    ContourPoint::off(600.0, 300.0),
                    ContourPoint::off(300.0, 700.0),
                    ContourPoint::curve(0.0, 700.0),
                ]))
                .with_anchor(Anchor::new("top", 300.0, 700.0)),
        );
        font.insert(
            Glyph::new("Aacute")
                .with_width(600.0)
                .with_component(Component::at("A", 0.0, 0.0))
                .with_component(Component::new("acute", Affine::new([1.0, 0.0, 0.0, 1.0, 200.0, 50.0]))),
        );
        font
    }

    #[test]
    fn test_ufo_preserves_outlines_and_metadata() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Test-Regular.ufo");
        let font = sample_font();

        save_ufo(&font, &path).unwrap();
        let loaded = load_ufo(&path).unwrap();

        assert_eq!(loaded.names(), vec!["A", "Aacute"]);
        assert_eq!(loaded.info.family_name.as_deref(), Some("Test Sans"));
        assert_eq!(loaded.features, font.features);
        assert_eq!(loaded.glyph("A"), font.glyph("A"));
        assert_eq!(loaded.glyph("Aacute"), font.glyph("Aacute"));
    }

    #[test]
    fn test_load_missing_ufo() {
        let dir = TempDir::new().unwrap();
        let result = load_ufo(dir.path().join("missing.ufo"));
        assert!(matches!(result, Err(Error::Load { .. })));
    }
}
