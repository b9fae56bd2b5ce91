use fontbuild_font_model::{Component, Contour, Font};
use kurbo::Affine;
use log::warn;

use crate::{
    clean::Decomposer,
    error::{Error, Result},
};

/// Built-in decomposer: replaces components with the base glyph outlines,
/// following nested components.
///
/// Components whose base glyph is missing stay in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComponentFlattener;

impl Decomposer for ComponentFlattener {
    fn decompose(&self, font: &mut Font, name: &str) -> Result<()> {
        let Some(glyph) = font.glyph(name) else {
            return Ok(());
        };
        if glyph.components.is_empty() {
            return Ok(());
        }

        let mut stack = vec![name.to_string()];
        let (contours, unresolved) =
            flatten_components(font, &glyph.components, Affine::IDENTITY, &mut stack)?;

        if let Some(glyph) = font.glyph_mut(name) {
            glyph.contours.extend(contours);
            glyph.components = unresolved;
        }
        Ok(())
    }
}

/// Resolve `components` into outlines mapped through `transform`.
///
/// Returns the flattened contours and the components that could not be
/// resolved because their base glyph is absent. `stack` holds the glyph
/// names currently being expanded.
pub fn flatten_components(
    font: &Font,
    components: &[Component],
    transform: Affine,
    stack: &mut Vec<String>,
) -> Result<(Vec<Contour>, Vec<Component>)> {
    let mut contours = Vec::new();
    let mut unresolved = Vec::new();

    for component in components {
        let combined = transform * component.transform;
        if stack.contains(&component.base) {
            return Err(Error::ComponentCycle(component.base.clone()));
        }
        let Some(base) = font.glyph(&component.base) else {
            warn!("Component base '{}' not found", component.base);
            unresolved.push(Component::new(component.base.clone(), combined));
            continue;
        };

        contours.extend(base.contours.iter().map(|c| {
            let mut c = c.clone();
            c.apply(combined);
            c
        }));

        if !base.components.is_empty() {
            stack.push(component.base.clone());
            let (nested, missing) = flatten_components(font, &base.components, combined, stack)?;
            stack.pop();
            contours.extend(nested);
            unresolved.extend(missing);
        }
    }

    Ok((contours, unresolved))
}
