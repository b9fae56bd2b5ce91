//! # Glyph operations
//!
//! Geometric and structural edits applied to glyphs while building a font
//! instance: affine transforms with consistent component deltas, contour
//! swaps, overlap removal, deletion, decomposition, italic slant and
//! composite glyph synthesis.
//!
//! The collaborator seams ([`OverlapResolver`], [`Decomposer`],
//! [`Italicizer`], [`GlyphGenerator`]) are traits with one built-in
//! implementation each.

mod clean;
mod compose;
mod decompose;
mod error;
mod italic;
mod normalize;
mod swap;
mod transform;

pub use clean::{
    Decomposer, OverlapResolver, decompose_glyphs, delete_glyphs, remove_glyph_overlap,
    remove_overlaps,
};
pub use compose::{
    AccentRef, CodepointMap, CompositeRule, CompositeRuleGenerator, GlyphGenerator, codepoint_for,
};
pub use decompose::{ComponentFlattener, flatten_components};
pub use error::{Error, Result};
pub use italic::{
    FULL_ANGLE, ITALIC_WIDEN, ItalicParams, Italicizer, PLACEHOLDER_GLYPH, REDUCED_ANGLE,
    SlantItalicizer,
};
pub use normalize::ContourNormalizer;
pub use swap::{swap_contours, swap_suffixed};
pub use transform::{component_delta, transform_glyph};
