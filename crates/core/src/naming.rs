//! Family and style naming for generated instances.

use anyhow::{Context, Result, bail};
use chrono::{Datelike, Local};
use fontbuild_font_model::{FontInfo, StyleMapStyle};

/// Style keywords and the OS/2 weight class they imply, first match wins.
const WEIGHT_CLASSES: [(&str, u32); 7] = [
    ("Thin", 250),
    ("Light", 300),
    ("Medium", 500),
    ("Black", 900),
    ("Bold", 700),
    ("Regular", 400),
    ("Italic", 400),
];

const DEFAULT_WEIGHT_CLASS: u32 = 400;

/// Names derived from an instance's `Family/Style` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceNames {
    pub family: String,
    pub style: String,
}

impl InstanceNames {
    pub fn parse(names: &str) -> Result<Self> {
        let Some((family, style)) = names.split_once('/') else {
            bail!("Instance name '{names}' is not in 'Family/Style' form");
        };
        let (family, style) = (family.trim(), style.trim());
        if family.is_empty() || style.is_empty() {
            bail!("Instance name '{names}' has an empty family or style");
        }
        Ok(Self { family: family.to_string(), style: style.to_string() })
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.family, self.style)
    }

    pub fn postscript_name(&self) -> String {
        format!("{}-{}", self.family, self.style).replace(' ', "")
    }

    pub fn is_italic(&self) -> bool {
        self.style.contains("Italic")
    }

    pub fn weight_class(&self) -> u32 {
        WEIGHT_CLASSES
            .iter()
            .find(|(keyword, _)| self.style.contains(keyword))
            .map_or(DEFAULT_WEIGHT_CLASS, |(_, class)| *class)
    }

    /// The style with any `Italic` removed, `Regular` when nothing is left.
    fn weight_name(&self) -> String {
        let weight = self.style.replace("Italic", "");
        let weight = weight.trim();
        if weight.is_empty() { "Regular".to_string() } else { weight.to_string() }
    }

    /// Whether the style is one of the four legacy styles
    /// (Regular, Italic, Bold, Bold Italic).
    fn is_ribbi(&self) -> bool {
        matches!(self.weight_name().as_str(), "Regular" | "Bold")
    }

    pub fn style_map_family(&self) -> String {
        if self.is_ribbi() {
            self.family.clone()
        } else {
            let weight = self.weight_name();
            let first = weight.split_whitespace().next().unwrap_or(&weight);
            format!("{} {first}", self.family)
        }
    }

    pub fn style_map_style(&self) -> StyleMapStyle {
        let bold = self.is_ribbi() && self.weight_name() == "Bold";
        match (bold, self.is_italic()) {
            (true, true) => StyleMapStyle::BoldItalic,
            (true, false) => StyleMapStyle::Bold,
            (false, true) => StyleMapStyle::Italic,
            (false, false) => StyleMapStyle::Regular,
        }
    }

    /// Write every naming field of `info`.
    ///
    /// `version` is `major.minor`, e.g. `2.001`.
    pub fn apply(&self, info: &mut FontInfo, foundry: &str, version: &str) -> Result<()> {
        let (major, minor) = version
            .split_once('.')
            .with_context(|| format!("Version '{version}' is not in 'major.minor' form"))?;
        let major: i32 =
            major.parse().with_context(|| format!("Invalid major version in '{version}'"))?;
        let minor: u32 =
            minor.parse().with_context(|| format!("Invalid minor version in '{version}'"))?;

        let full_name = self.full_name();
        let year = Local::now().year();

        info.family_name = Some(self.family.clone());
        info.style_name = Some(self.style.clone());
        info.style_map_family_name = Some(self.style_map_family());
        info.style_map_style_name = Some(self.style_map_style());
        info.open_type_name_preferred_family_name = Some(self.family.clone());
        info.open_type_name_preferred_subfamily_name = Some(self.style.clone());
        info.open_type_name_compatible_full_name = Some(full_name.clone());
        info.postscript_font_name = Some(self.postscript_name());
        info.postscript_full_name = Some(full_name.clone());
        info.open_type_name_manufacturer = Some(foundry.to_string());
        info.version_major = Some(major);
        info.version_minor = Some(minor);
        info.open_type_name_version = Some(format!("Version {version}"));
        info.open_type_name_unique_id = Some(format!("{foundry}:{full_name}:{year}"));
        info.open_type_os2_weight_class = Some(self.weight_class());
        Ok(())
    }
}
