//! Italic slant.

use fontbuild_font_model::Glyph;
use kurbo::Affine;

use crate::{error::Result, transform::transform_glyph};

/// Slant angle, in degrees, for regular glyphs.
pub const FULL_ANGLE: f64 = 10.0;
/// Slant angle, in degrees, for glyphs in the less-italic set.
pub const REDUCED_ANGLE: f64 = 9.0;
/// Units added to every non-zero advance width after slanting.
pub const ITALIC_WIDEN: f64 = 10.0;
/// Glyph left untouched by italicization.
pub const PLACEHOLDER_GLYPH: &str = "uniFFFD";

/// Per-instance italic coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItalicParams {
    /// Stem adjustment amount; lower for Thin weights.
    pub tweak: f64,
    /// Horizontal condensing factor; closer to 1 for Condensed widths.
    pub narrow: f64,
    /// Target stem width in font units.
    pub stem_width: f64,
}

impl ItalicParams {
    /// Pick coefficients from a `Family/Style` instance name.
    pub fn for_instance(names: &str, stem_width: f64) -> Self {
        Self {
            tweak: if names.contains("Thin") { 0.05 } else { 0.085 },
            narrow: if names.contains("Condensed") { 0.96 } else { 0.93 },
            stem_width,
        }
    }
}

/// Applies an italic slant to one glyph.
pub trait Italicizer: Send + Sync {
    fn italicize(&self, glyph: &mut Glyph, angle: f64, params: &ItalicParams) -> Result<()>;
}

/// Shears glyphs by the slant angle, then slides them horizontally by the
/// sheared x of `(0, mean_y_center)`, which keeps the line
/// `y = -mean_y_center` in place.
///
/// With `condense` set, the x axis is also scaled by
/// [`ItalicParams::narrow`], which rescales advance widths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlantItalicizer {
    pub mean_y_center: f64,
    pub condense: bool,
}

impl Default for SlantItalicizer {
    fn default() -> Self {
        Self { mean_y_center: -825.0, condense: false }
    }
}

impl SlantItalicizer {
    pub fn matrix(&self, angle: f64, params: &ItalicParams) -> Affine {
        let slope = angle.to_radians().tanh();
        let narrow = if self.condense { params.narrow } else { 1.0 };
        Affine::new([narrow, 0.0, slope, 1.0, slope * self.mean_y_center, 0.0])
    }
}

impl Italicizer for SlantItalicizer {
    fn italicize(&self, glyph: &mut Glyph, angle: f64, params: &ItalicParams) -> Result<()> {
        transform_glyph(glyph, self.matrix(angle, params));
        Ok(())
    }
}
