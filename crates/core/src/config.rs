//! Project configuration and resource files.

use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use fontbuild_glyph_ops::{CodepointMap, SlantItalicizer};
use log::{debug, warn};
use serde::Deserialize;

/// Default target stem width for italic instances.
pub const DEFAULT_STEM_WIDTH: f64 = 185.0;

/// Project-specific glyph names that are not in the Adobe Glyph List,
/// paired with the AGL name whose codepoint they take.
pub const GLYPH_LIST_ALIASES: [(&str, &str); 4] = [
    ("Obar", "Ocenteredtilde"),
    ("obar", "obarred"),
    ("eturn", "eturned"),
    ("Iota1", "Iotaafrican"),
];

/// Build configuration, read from a TOML file.
///
/// ```toml
/// [main]
/// foundry = "Google"
/// version = "2.001"
///
/// [glyphs]
/// delete = ["uni0488", "uni0489"]
///
/// [res]
/// diacriticfile = "res/diacritics.txt"
///
/// [[instance]]
/// name = "Roboto/Regular"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    pub main: MainSection,
    #[serde(default)]
    pub glyphs: GlyphSets,
    #[serde(default)]
    pub res: ResourcePaths,
    #[serde(default)]
    pub italic: ItalicSection,
    #[serde(default, rename = "instance")]
    pub instances: Vec<InstanceConfig>,
    /// Directory the configuration was read from; resource paths resolve
    /// against it.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MainSection {
    pub foundry: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GlyphSets {
    pub decompose: Vec<String>,
    pub predecompose: Vec<String>,
    #[serde(rename = "lessitalic")]
    pub less_italic: Vec<String>,
    pub delete: Vec<String>,
    #[serde(rename = "noitalic")]
    pub no_italic: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResourcePaths {
    #[serde(rename = "diacriticfile")]
    pub diacritic_file: Option<PathBuf>,
    #[serde(rename = "agl_glyphlistfile")]
    pub glyph_list_file: Option<PathBuf>,
    #[serde(rename = "glyphorder")]
    pub glyph_order: Option<PathBuf>,
    #[serde(rename = "glyphorder_thin")]
    pub glyph_order_thin: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ItalicSection {
    pub mean_y_center: f64,
    pub condense: bool,
}

impl Default for ItalicSection {
    fn default() -> Self {
        let slant = SlantItalicizer::default();
        Self { mean_y_center: slant.mean_y_center, condense: slant.condense }
    }
}

impl From<ItalicSection> for SlantItalicizer {
    fn from(section: ItalicSection) -> Self {
        Self { mean_y_center: section.mean_y_center, condense: section.condense }
    }
}

/// One `[[instance]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct InstanceConfig {
    /// `Family/Style`.
    pub name: String,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub swap_suffixes: Vec<String>,
    #[serde(default = "default_stem_width")]
    pub stem_width: f64,
    /// Interpolate between two masters instead of copying the base font.
    pub mix: Option<MixConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MixConfig {
    /// Two UFO paths, relative to the configuration directory.
    pub masters: [PathBuf; 2],
    pub factor: MixFactor,
}

/// Interpolation factor, either shared by both axes or given per axis.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MixFactor {
    Uniform(f64),
    PerAxis([f64; 2]),
}

impl MixFactor {
    pub fn xy(self) -> (f64, f64) {
        match self {
            MixFactor::Uniform(f) => (f, f),
            MixFactor::PerAxis([x, y]) => (x, y),
        }
    }
}

fn default_stem_width() -> f64 {
    DEFAULT_STEM_WIDTH
}

impl ProjectConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let mut config: Self = toml::from_str(&text)
            .with_context(|| format!("Invalid config: {}", path.display()))?;
        config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(config)
    }

    /// Resolve a path from the configuration against its directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.base_dir.join(path)
    }
}

/// Contents of the resource files named in `[res]`.
#[derive(Debug, Clone, Default)]
pub struct Resources {
    /// Raw diacritic rule lines; comments and blanks are kept for the
    /// generation driver to filter.
    pub diacritics: Vec<String>,
    pub codepoints: CodepointMap,
    pub glyph_order: Vec<String>,
    pub glyph_order_thin: Vec<String>,
}

impl Resources {
    /// Read every resource named in `config`. Absent entries stay empty.
    pub fn load(config: &ProjectConfig) -> Result<Self> {
        let read = |path: &Option<PathBuf>| -> Result<Option<String>> {
            path.as_deref()
                .map(|p| {
                    let p = config.resolve(p);
                    read_to_string(&p)
                        .with_context(|| format!("Failed to read resource: {}", p.display()))
                })
                .transpose()
        };

        let res = &config.res;
        let mut resources = Self::default();
        if let Some(text) = read(&res.diacritic_file)? {
            resources.diacritics = text.lines().map(str::to_string).collect();
        }
        if let Some(text) = read(&res.glyph_list_file)? {
            resources.codepoints = parse_glyph_list(&text)?;
        }
        if let Some(text) = read(&res.glyph_order)? {
            resources.glyph_order = parse_glyph_order(&text);
        }
        if let Some(text) = read(&res.glyph_order_thin)? {
            resources.glyph_order_thin = parse_glyph_order(&text);
        }
        Ok(resources)
    }
}

/// Parse an AGL-style glyph list: `name;HEX` per line, `#` comments.
///
/// Entries mapping to a sequence of codepoints are skipped. The names in
/// [`GLYPH_LIST_ALIASES`] are added when their AGL counterpart is listed.
pub fn parse_glyph_list(text: &str) -> Result<CodepointMap> {
    let mut map = CodepointMap::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (name, hex) = line
            .split_once(';')
            .with_context(|| format!("Glyph list line {}: expected 'name;HEX'", lineno + 1))?;
        let hex = hex.trim();
        if hex.contains(' ') {
            debug!("Skipping multi-codepoint glyph list entry '{name}'");
            continue;
        }
        let codepoint = u32::from_str_radix(hex, 16)
            .ok()
            .and_then(char::from_u32)
            .with_context(|| format!("Glyph list line {}: invalid codepoint '{hex}'", lineno + 1))?;
        map.insert(name.trim().to_string(), codepoint);
    }

    for (alias, agl_name) in GLYPH_LIST_ALIASES {
        match map.get(agl_name) {
            Some(&c) => {
                map.insert(alias.to_string(), c);
            }
            None => warn!("Glyph list has no '{agl_name}' for alias '{alias}'"),
        }
    }
    Ok(map)
}

/// One glyph name per line; blank lines and `#` comments are ignored.
pub fn parse_glyph_order(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}
