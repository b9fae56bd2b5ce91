//! Minimal TrueType compiler: glyf outlines plus the required sfnt tables.

use std::collections::BTreeMap;

use fontbuild_font_model::{Font, FontInfo, StyleMapStyle};
use fontbuild_glyph_ops::flatten_components;
use kurbo::Affine;
use log::{debug, info};
use read_fonts::{tables::glyf::CurvePoint, types::GlyphId};
use write_fonts::{
    FontBuilder,
    tables::{
        cmap::Cmap,
        glyf::{Bbox, Contour, GlyfLocaBuilder, Glyph as WriteGlyph, SimpleGlyph},
        head::{Flags, Head, MacStyle},
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        loca::LocaFormat,
        maxp::Maxp,
        name::{Name, NameRecord},
        os2::{Os2, SelectionFlags},
        post::Post,
    },
};

use crate::{
    FontCompiler, OutputFormat,
    error::{Error, Result},
    glyph_order::resolve_glyph_order,
};

/// Compiles quadratic fonts to TrueType with `head`, `hhea`, `hmtx`, `maxp`,
/// `cmap`, `post`, `name`, `OS/2`, `glyf` and `loca` tables.
///
/// Components are flattened into outlines and dangling component
/// references are dropped. Feature text is not compiled.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrueTypeCompiler;

struct CompiledGlyph {
    glyph: WriteGlyph,
    bbox: Option<Bbox>,
    advance: u16,
    points: usize,
    contours: usize,
}

impl CompiledGlyph {
    fn lsb(&self) -> i16 {
        self.bbox.map_or(0, |b| b.x_min)
    }
}

impl FontCompiler for TrueTypeCompiler {
    fn supports(&self, format: OutputFormat) -> bool {
        format == OutputFormat::TrueType
    }

    fn compile(&self, font: &Font, glyph_order: &[String], format: OutputFormat) -> Result<Vec<u8>> {
        if !self.supports(format) {
            return Err(Error::UnsupportedFormat(format));
        }

        let order = resolve_glyph_order(font, glyph_order);
        let upm = font.units_per_em();
        let glyphs = order
            .iter()
            .map(|name| compile_glyph(font, name, upm))
            .collect::<Result<Vec<_>>>()?;

        let mut glyf_builder = GlyfLocaBuilder::new();
        for glyph in &glyphs {
            glyf_builder.add_glyph(&glyph.glyph)?;
        }
        let (glyf, loca, loca_format) = glyf_builder.build();

        let mut mappings: BTreeMap<char, GlyphId> = BTreeMap::new();
        for (gid, name) in order.iter().enumerate() {
            let Some(glyph) = font.glyph(name) else { continue };
            for codepoint in &glyph.codepoints {
                mappings.entry(*codepoint).or_insert(GlyphId::new(gid as u32));
            }
        }
        let cmap = Cmap::from_mappings(mappings.iter().map(|(c, g)| (*c, *g)))
            .map_err(|e| Error::Cmap(e.to_string()))?;

        let metrics = Metrics::from_glyphs(&glyphs);
        let units_per_em = upm.round().clamp(16.0, 16384.0) as u16;
        let ascender = font.info.ascender.unwrap_or(upm * 0.8).round() as i16;
        let descender = font.info.descender.unwrap_or(-upm * 0.2).round() as i16;

        let head = Head {
            font_revision: font_types::Fixed::from_f64(font_revision(&font.info)),
            checksum_adjustment: 0,
            magic_number: 0x5F0F3CF5,
            flags: Flags::empty(),
            units_per_em,
            created: font_types::LongDateTime::new(0),
            modified: font_types::LongDateTime::new(0),
            x_min: metrics.bounds.x_min,
            y_min: metrics.bounds.y_min,
            x_max: metrics.bounds.x_max,
            y_max: metrics.bounds.y_max,
            mac_style: mac_style(style_map(&font.info)),
            lowest_rec_ppem: 8,
            font_direction_hint: 2,
            index_to_loc_format: match loca_format {
                LocaFormat::Short => 0,
                LocaFormat::Long => 1,
            },
        };

        let hhea = Hhea {
            ascender: font_types::FWord::new(ascender),
            descender: font_types::FWord::new(descender),
            line_gap: font_types::FWord::new(0),
            advance_width_max: font_types::UfWord::new(metrics.advance_max),
            min_left_side_bearing: font_types::FWord::new(metrics.min_lsb),
            min_right_side_bearing: font_types::FWord::new(metrics.min_rsb),
            x_max_extent: font_types::FWord::new(metrics.x_max_extent),
            caret_slope_rise: 1,
            caret_slope_run: 0,
            caret_offset: 0,
            number_of_h_metrics: glyphs.len() as u16,
        };

        let hmtx = Hmtx {
            h_metrics: glyphs
                .iter()
                .map(|g| LongMetric { advance: g.advance, side_bearing: g.lsb() })
                .collect(),
            left_side_bearings: vec![],
        };

        let maxp = Maxp {
            num_glyphs: glyphs.len() as u16,
            max_points: Some(metrics.max_points),
            max_contours: Some(metrics.max_contours),
            max_composite_points: Some(0),
            max_composite_contours: Some(0),
            max_zones: Some(1),
            max_twilight_points: Some(0),
            max_storage: Some(0),
            max_function_defs: Some(0),
            max_instruction_defs: Some(0),
            max_stack_elements: Some(0),
            max_size_of_instructions: Some(0),
            max_component_elements: Some(0),
            max_component_depth: Some(0),
        };

        let mut post = Post::new_v2(order.iter().map(String::as_str));
        post.italic_angle = font_types::Fixed::from_f64(font.info.italic_angle.unwrap_or(0.0));
        post.underline_position = font_types::FWord::new((-upm * 0.075).round() as i16);
        post.underline_thickness = font_types::FWord::new((upm * 0.05).round() as i16);

        let os2 = build_os2(font, &glyphs, &mappings, upm, ascender, descender, &metrics);
        let name = build_name(&font.info);

        let mut builder = FontBuilder::new();
        builder.add_table(&head)?;
        builder.add_table(&hhea)?;
        builder.add_table(&hmtx)?;
        builder.add_table(&maxp)?;
        builder.add_table(&cmap)?;
        builder.add_table(&post)?;
        builder.add_table(&name)?;
        builder.add_table(&os2)?;
        builder.add_table(&glyf)?;
        builder.add_table(&loca)?;
        let data = builder.build();

        info!("Compiled {} glyphs ({} bytes)", glyphs.len(), data.len());
        Ok(data)
    }
}

fn compile_glyph(font: &Font, name: &str, upm: f64) -> Result<CompiledGlyph> {
    let Some(glyph) = font.glyph(name) else {
        debug!("Synthesizing empty {name}");
        return Ok(CompiledGlyph {
            glyph: WriteGlyph::Empty,
            bbox: None,
            advance: to_advance(upm / 2.0),
            points: 0,
            contours: 0,
        });
    };

    let mut outlines = glyph.contours.clone();
    if glyph.has_components() {
        let mut stack = vec![name.to_string()];
        let (flattened, dangling) =
            flatten_components(font, &glyph.components, Affine::IDENTITY, &mut stack)?;
        for component in &dangling {
            debug!("Dropping dangling component '{}' from '{name}'", component.base);
        }
        outlines.extend(flattened);
    }

    let mut contours = Vec::with_capacity(outlines.len());
    for outline in outlines.iter().filter(|c| !c.is_empty()) {
        if outline.has_cubic() {
            return Err(Error::CubicCurve(name.to_string()));
        }
        let points = outline
            .points
            .iter()
            .map(|p| {
                Ok(CurvePoint {
                    x: to_coord(p.x, name)?,
                    y: to_coord(p.y, name)?,
                    on_curve: p.typ.is_on_curve(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        contours.push(Contour::from(points));
    }

    let advance = to_advance(glyph.width);
    if contours.is_empty() {
        return Ok(CompiledGlyph { glyph: WriteGlyph::Empty, bbox: None, advance, points: 0, contours: 0 });
    }

    let bbox = bounding_box(&contours);
    let points = contours.iter().map(|c| c.len()).sum();
    let count = contours.len();
    Ok(CompiledGlyph {
        glyph: WriteGlyph::Simple(SimpleGlyph { bbox, contours, instructions: vec![] }),
        bbox: Some(bbox),
        advance,
        points,
        contours: count,
    })
}

fn to_coord(value: f64, glyph: &str) -> Result<i16> {
    let rounded = value.round();
    if rounded < i16::MIN as f64 || rounded > i16::MAX as f64 {
        return Err(Error::CoordinateOverflow(glyph.to_string()));
    }
    Ok(rounded as i16)
}

fn to_advance(width: f64) -> u16 {
    width.round().clamp(0.0, u16::MAX as f64) as u16
}

fn bounding_box(contours: &[Contour]) -> Bbox {
    let mut points = contours.iter().flat_map(|c| c.iter());
    let Some(first) = points.next() else {
        return Bbox::default();
    };
    points.fold(
        Bbox { x_min: first.x, y_min: first.y, x_max: first.x, y_max: first.y },
        |b, p| Bbox {
            x_min: b.x_min.min(p.x),
            y_min: b.y_min.min(p.y),
            x_max: b.x_max.max(p.x),
            y_max: b.y_max.max(p.y),
        },
    )
}

/// Font-wide metrics collected from compiled glyphs.
struct Metrics {
    bounds: Bbox,
    advance_max: u16,
    min_lsb: i16,
    min_rsb: i16,
    x_max_extent: i16,
    max_points: u16,
    max_contours: u16,
}

impl Metrics {
    fn from_glyphs(glyphs: &[CompiledGlyph]) -> Self {
        let mut bounds: Option<Bbox> = None;
        let mut metrics = Metrics {
            bounds: Bbox::default(),
            advance_max: 0,
            min_lsb: i16::MAX,
            min_rsb: i16::MAX,
            x_max_extent: i16::MIN,
            max_points: 0,
            max_contours: 0,
        };

        for glyph in glyphs {
            metrics.advance_max = metrics.advance_max.max(glyph.advance);
            metrics.max_points = metrics.max_points.max(glyph.points.min(u16::MAX as usize) as u16);
            metrics.max_contours =
                metrics.max_contours.max(glyph.contours.min(u16::MAX as usize) as u16);

            let Some(b) = glyph.bbox else { continue };
            let rsb = glyph.advance as i32 - b.x_max as i32;
            metrics.min_lsb = metrics.min_lsb.min(b.x_min);
            metrics.min_rsb = metrics.min_rsb.min(rsb.clamp(i16::MIN as i32, i16::MAX as i32) as i16);
            metrics.x_max_extent = metrics.x_max_extent.max(b.x_max);
            bounds = Some(match bounds {
                None => b,
                Some(u) => Bbox {
                    x_min: u.x_min.min(b.x_min),
                    y_min: u.y_min.min(b.y_min),
                    x_max: u.x_max.max(b.x_max),
                    y_max: u.y_max.max(b.y_max),
                },
            });
        }

        match bounds {
            Some(b) => metrics.bounds = b,
            None => {
                metrics.min_lsb = 0;
                metrics.min_rsb = 0;
                metrics.x_max_extent = 0;
            }
        }
        metrics
    }
}

fn font_revision(info: &FontInfo) -> f64 {
    let major = info.version_major.unwrap_or(1) as f64;
    let minor = info.version_minor.unwrap_or(0) as f64;
    major + minor / 1000.0
}

/// The font's style map style, derived from the style name when unset.
fn style_map(info: &FontInfo) -> StyleMapStyle {
    info.style_map_style_name.unwrap_or_else(|| match info.style_name.as_deref() {
        Some("Bold") => StyleMapStyle::Bold,
        Some("Bold Italic" | "BoldItalic") => StyleMapStyle::BoldItalic,
        Some(s) if s.contains("Italic") => StyleMapStyle::Italic,
        _ => StyleMapStyle::Regular,
    })
}

/// Legacy (RIBBI) subfamily for name ID 2.
fn legacy_subfamily(style: StyleMapStyle) -> &'static str {
    match style {
        StyleMapStyle::Regular => "Regular",
        StyleMapStyle::Italic => "Italic",
        StyleMapStyle::Bold => "Bold",
        StyleMapStyle::BoldItalic => "Bold Italic",
    }
}

fn mac_style(style: StyleMapStyle) -> MacStyle {
    match style {
        StyleMapStyle::Regular => MacStyle::empty(),
        StyleMapStyle::Italic => MacStyle::ITALIC,
        StyleMapStyle::Bold => MacStyle::BOLD,
        StyleMapStyle::BoldItalic => MacStyle::BOLD | MacStyle::ITALIC,
    }
}

/// `fsSelection` from the font info bits, with the style bits replaced by
/// the ones the style map implies.
fn fs_selection(info: &FontInfo) -> SelectionFlags {
    let bits = info
        .open_type_os2_selection
        .as_ref()
        .map_or(0u16, |bits| bits.iter().filter(|b| **b < 16).fold(0, |acc, b| acc | (1 << b)));
    let mut selection = SelectionFlags::from_bits_truncate(bits)
        - (SelectionFlags::ITALIC | SelectionFlags::BOLD | SelectionFlags::REGULAR);
    selection |= match style_map(info) {
        StyleMapStyle::Regular => SelectionFlags::REGULAR,
        StyleMapStyle::Italic => SelectionFlags::ITALIC,
        StyleMapStyle::Bold => SelectionFlags::BOLD,
        StyleMapStyle::BoldItalic => SelectionFlags::BOLD | SelectionFlags::ITALIC,
    };
    selection
}

fn build_name(info: &FontInfo) -> Name {
    let family = info.family_name.clone().unwrap_or_else(|| "Untitled".to_string());
    let style = info.style_name.clone().unwrap_or_else(|| "Regular".to_string());
    let full_name = info
        .open_type_name_compatible_full_name
        .clone()
        .unwrap_or_else(|| format!("{family} {style}"));
    let version = info.open_type_name_version.clone().unwrap_or_else(|| {
        format!(
            "Version {}.{:03}",
            info.version_major.unwrap_or(1),
            info.version_minor.unwrap_or(0)
        )
    });
    let postscript = info
        .postscript_font_name
        .clone()
        .unwrap_or_else(|| format!("{family}-{style}").replace(' ', ""));

    let mut entries: Vec<(u16, String)> = vec![
        (1, info.style_map_family_name.clone().unwrap_or_else(|| family.clone())),
        (2, legacy_subfamily(style_map(info)).to_string()),
        (3, info.open_type_name_unique_id.clone().unwrap_or_else(|| postscript.clone())),
        (4, full_name),
        (5, version),
        (6, postscript),
    ];
    let optional = [
        (8, &info.open_type_name_manufacturer),
        (16, &info.open_type_name_preferred_family_name),
        (17, &info.open_type_name_preferred_subfamily_name),
    ];
    entries.extend(
        optional
            .into_iter()
            .filter_map(|(id, value)| value.clone().map(|v| (id, v))),
    );
    entries.sort_by_key(|(id, _)| *id);

    Name::new(
        entries
            .into_iter()
            .map(|(id, value)| {
                NameRecord::new(3, 1, 0x409, read_fonts::types::NameId::new(id), value.into())
            })
            .collect(),
    )
}

fn build_os2(
    font: &Font,
    glyphs: &[CompiledGlyph],
    mappings: &BTreeMap<char, GlyphId>,
    upm: f64,
    ascender: i16,
    descender: i16,
    metrics: &Metrics,
) -> Os2 {
    let info = &font.info;
    let scaled = |factor: f64| (upm * factor).round() as i16;

    let advances: Vec<u32> = glyphs.iter().map(|g| g.advance as u32).filter(|a| *a != 0).collect();
    let x_avg_char_width = match advances.len() {
        0 => 0,
        n => (advances.iter().sum::<u32>() / n as u32).min(i16::MAX as u32) as i16,
    };

    let first_char = mappings.keys().next().map_or(0, |c| (*c as u32).min(0xFFFF) as u16);
    let last_char = mappings.keys().next_back().map_or(0, |c| (*c as u32).min(0xFFFF) as u16);

    Os2 {
        x_avg_char_width,
        us_weight_class: info.open_type_os2_weight_class.unwrap_or(400).min(1000) as u16,
        us_width_class: 5,
        fs_type: 0,
        y_subscript_x_size: scaled(0.65),
        y_subscript_y_size: scaled(0.6),
        y_subscript_x_offset: 0,
        y_subscript_y_offset: scaled(0.075),
        y_superscript_x_size: scaled(0.65),
        y_superscript_y_size: scaled(0.6),
        y_superscript_x_offset: 0,
        y_superscript_y_offset: scaled(0.35),
        y_strikeout_size: scaled(0.05),
        y_strikeout_position: scaled(0.3),
        s_family_class: 0,
        panose_10: [0; 10],
        ul_unicode_range_1: 0,
        ul_unicode_range_2: 0,
        ul_unicode_range_3: 0,
        ul_unicode_range_4: 0,
        ach_vend_id: font_types::Tag::new(b"NONE"),
        fs_selection: fs_selection(info),
        us_first_char_index: first_char,
        us_last_char_index: last_char,
        s_typo_ascender: ascender,
        s_typo_descender: descender,
        s_typo_line_gap: 0,
        us_win_ascent: metrics.bounds.y_max.max(ascender).max(0) as u16,
        us_win_descent: (-(metrics.bounds.y_min.min(descender) as i32)).max(0) as u16,
        ul_code_page_range_1: Some(0),
        ul_code_page_range_2: Some(0),
        sx_height: Some(info.x_height.map_or(scaled(0.5), |v| v.round() as i16)),
        s_cap_height: Some(info.cap_height.map_or(scaled(0.7), |v| v.round() as i16)),
        us_default_char: Some(0),
        us_break_char: Some(0x20),
        us_max_context: Some(0),
        us_lower_optical_point_size: None,
        us_upper_optical_point_size: None,
    }
}

#[cfg(test)]
mod tests {
    use fontbuild_font_model::{Component, ContourPoint, Glyph};
    use read_fonts::{FontRef, TableProvider};

    use super::*;

    fn square(x: f64) -> fontbuild_font_model::Contour {
        fontbuild_font_model::Contour::new(vec![
            ContourPoint::line(x, 0.0),
            ContourPoint::line(x + 100.0, 0.0),
            ContourPoint::line(x + 100.0, 700.0),
            ContourPoint::qcurve(x, 700.0),
        ])
    }

    fn font() -> Font {
        let mut font: Font = [
            Glyph::new("A").with_width(600.0).with_codepoint('A').with_contour(square(50.0)),
            Glyph::new("B").with_width(620.0).with_codepoint('B').with_contour(square(60.0)),
            Glyph::new("AB")
                .with_width(1220.0)
                .with_component(Component::at("A", 0.0, 0.0))
                .with_component(Component::at("B", 600.0, 0.0))
                .with_component(Component::at("deleted", 0.0, 0.0)),
            Glyph::new("space").with_width(250.0).with_codepoint(' '),
        ]
        .into_iter()
        .collect();
        font.info.family_name = Some("Test Sans".to_string());
        font.info.style_name = Some("Regular".to_string());
        font
    }

    #[test]
    fn test_compiled_font_parses() {
        let data = TrueTypeCompiler
            .compile(&font(), &["space".to_string()], OutputFormat::TrueType)
            .unwrap();
        let compiled = FontRef::new(&data).unwrap();

        assert_eq!(compiled.maxp().unwrap().num_glyphs(), 5);
        assert_eq!(compiled.head().unwrap().units_per_em(), 1000);
        let cmap = compiled.cmap().unwrap();
        assert_eq!(cmap.map_codepoint(0x20u32), Some(GlyphId::new(1)));
        assert_eq!(cmap.map_codepoint(0x41u32), Some(GlyphId::new(2)));
        assert_eq!(compiled.hmtx().unwrap().advance(GlyphId::new(2)), Some(600));
    }

    #[test]
    fn test_components_are_flattened() {
        let data = TrueTypeCompiler.compile(&font(), &[], OutputFormat::TrueType).unwrap();
        let compiled = FontRef::new(&data).unwrap();
        assert_eq!(compiled.maxp().unwrap().max_contours(), Some(2));
        assert_eq!(compiled.maxp().unwrap().max_points(), Some(8));
    }

    #[test]
    fn test_cubic_outline_is_rejected() {
        let mut font = font();
        font.insert(Glyph::new("C").with_contour(fontbuild_font_model::Contour::new(vec![
            ContourPoint::line(0.0, 0.0),
            ContourPoint::off(100.0, 0.0),
            ContourPoint::off(100.0, 100.0),
            ContourPoint::curve(0.0, 100.0),
        ])));

        let err = TrueTypeCompiler.compile(&font, &[], OutputFormat::TrueType).unwrap_err();
        assert!(matches!(err, Error::CubicCurve(name) if name == "C"));
    }

    #[test]
    fn test_opentype_is_unsupported() {
        assert!(TrueTypeCompiler.supports(OutputFormat::TrueType));
        assert!(!TrueTypeCompiler.supports(OutputFormat::OpenType));
        let err = TrueTypeCompiler.compile(&font(), &[], OutputFormat::OpenType).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(OutputFormat::OpenType)));
    }

    fn styled(style: &str, style_map: Option<StyleMapStyle>) -> Font {
        let mut font = font();
        font.info.style_name = Some(style.to_string());
        font.info.style_map_style_name = style_map;
        font
    }

    fn style_bits(font: &Font) -> (SelectionFlags, MacStyle) {
        let data = TrueTypeCompiler.compile(font, &[], OutputFormat::TrueType).unwrap();
        let compiled = FontRef::new(&data).unwrap();
        (compiled.os2().unwrap().fs_selection(), compiled.head().unwrap().mac_style())
    }

    #[test]
    fn test_bold_style_bits() {
        let (selection, mac) = style_bits(&styled("Bold", Some(StyleMapStyle::Bold)));
        assert_eq!(selection, SelectionFlags::BOLD);
        assert_eq!(mac, MacStyle::BOLD);
    }

    #[test]
    fn test_italic_style_bits() {
        // An oblique italic instance carries bit 9 from the font info.
        let mut font = styled("Thin Italic", Some(StyleMapStyle::Italic));
        font.info.open_type_os2_selection = Some(vec![9]);

        let (selection, mac) = style_bits(&font);
        assert_eq!(selection, SelectionFlags::ITALIC | SelectionFlags::OBLIQUE);
        assert_eq!(mac, MacStyle::ITALIC);
    }

    #[test]
    fn test_regular_style_bits() {
        let (selection, mac) = style_bits(&styled("Medium", Some(StyleMapStyle::Regular)));
        assert_eq!(selection, SelectionFlags::REGULAR);
        assert_eq!(mac, MacStyle::empty());
    }

    #[test]
    fn test_style_map_fallback() {
        let (selection, mac) = style_bits(&styled("Bold Italic", None));
        assert_eq!(selection, SelectionFlags::BOLD | SelectionFlags::ITALIC);
        assert_eq!(mac, MacStyle::BOLD | MacStyle::ITALIC);
        assert_eq!(style_map(&styled("Black Italic", None).info), StyleMapStyle::Italic);
        assert_eq!(style_map(&styled("Thin", None).info), StyleMapStyle::Regular);
    }

    #[test]
    fn test_legacy_subfamily() {
        assert_eq!(legacy_subfamily(StyleMapStyle::Bold), "Bold");
        assert_eq!(legacy_subfamily(StyleMapStyle::BoldItalic), "Bold Italic");
        assert_eq!(legacy_subfamily(StyleMapStyle::Regular), "Regular");
    }
}
