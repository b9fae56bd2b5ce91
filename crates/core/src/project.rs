//! Instance builds and the batch binary stage.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use fontbuild_font_compiler::{FontCompiler, OutputFormat, TrueTypeCompiler};
use fontbuild_font_curves::{CurveConverter, MAX_ERR_EM, SplineConverter};
use fontbuild_font_model::{Font, load_ufo};
use fontbuild_glyph_ops::{
    ComponentFlattener, CompositeRuleGenerator, ContourNormalizer, Decomposer, FULL_ANGLE,
    GlyphGenerator, ITALIC_WIDEN, ItalicParams, Italicizer, OverlapResolver, PLACEHOLDER_GLYPH,
    REDUCED_ANGLE, SlantItalicizer, decompose_glyphs, delete_glyphs, remove_glyph_overlap,
    remove_overlaps, swap_suffixed,
};
use log::{debug, error, info};
use rayon::prelude::*;
use read_fonts::FontRef;

use crate::{
    config::{DEFAULT_STEM_WIDTH, GlyphSets, ProjectConfig, Resources},
    diacritics::generate_glyphs,
    io::{FontFile, output_path},
    mix::MasterMixer,
    naming::InstanceNames,
    queue::{BuildQueue, QueuedFont},
};

/// OS/2 `fsSelection` bit set on italic instances.
const OBLIQUE_SELECTION_BIT: u8 = 9;

/// Where an instance's outlines come from.
#[derive(Clone, Copy)]
pub enum FontSource<'a> {
    /// Copy this font.
    Font(&'a Font),
    /// Resolve against the project's base font.
    Mix(&'a dyn MasterMixer),
}

/// Style parameters of one instance.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceOptions {
    pub italic: bool,
    pub swap_suffixes: Vec<String>,
    pub stem_width: f64,
}

impl Default for InstanceOptions {
    fn default() -> Self {
        Self { italic: false, swap_suffixes: Vec::new(), stem_width: DEFAULT_STEM_WIDTH }
    }
}

/// The geometry and compilation collaborators used by a project.
pub struct Toolchain {
    pub resolver: Box<dyn OverlapResolver>,
    pub decomposer: Box<dyn Decomposer>,
    pub italicizer: Box<dyn Italicizer>,
    pub generator: Box<dyn GlyphGenerator>,
    pub converter: Box<dyn CurveConverter>,
    pub compiler: Box<dyn FontCompiler>,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            resolver: Box::new(ContourNormalizer),
            decomposer: Box::new(ComponentFlattener),
            italicizer: Box::new(SlantItalicizer::default()),
            generator: Box::new(CompositeRuleGenerator),
            converter: Box::new(SplineConverter),
            compiler: Box::new(TrueTypeCompiler),
        }
    }
}

impl Toolchain {
    /// Built-in collaborators, with the italic settings from `config`.
    pub fn from_config(config: &ProjectConfig) -> Self {
        Self { italicizer: Box::new(SlantItalicizer::from(config.italic)), ..Self::default() }
    }
}

/// Binaries written and failed by [`FontProject::generate_ttfs`] or the
/// OpenType step of [`FontProject::generate_font`].
#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: Vec<PathBuf>,
    /// Queued source and the error that stopped it.
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Builds named instances of a family from a base font.
pub struct FontProject {
    base_font: Font,
    /// Output root; the build directory lives beneath it.
    base_dir: PathBuf,
    pub build_dir: PathBuf,
    foundry: String,
    version: String,
    glyphs: GlyphSets,
    resources: Resources,
    toolchain: Toolchain,
    /// Also compile an OpenType binary for every instance.
    pub build_otf: bool,
    /// Keep outlines interpolation compatible: skip overlap removal and
    /// convert curves jointly.
    pub compatible: bool,
    queue: BuildQueue,
    otf_report: BatchReport,
}

impl FontProject {
    pub fn new(
        base_font: Font,
        base_dir: impl Into<PathBuf>,
        config: &ProjectConfig,
        resources: Resources,
        toolchain: Toolchain,
    ) -> Self {
        Self {
            base_font,
            base_dir: base_dir.into(),
            build_dir: PathBuf::from("out"),
            foundry: config.main.foundry.clone(),
            version: config.main.version.clone(),
            glyphs: config.glyphs.clone(),
            resources,
            toolchain,
            build_otf: false,
            compatible: false,
            queue: BuildQueue::default(),
            otf_report: BatchReport::default(),
        }
    }

    /// Load the base UFO and every resource named in the configuration,
    /// with the built-in collaborators.
    pub fn open(base_ufo: impl AsRef<Path>, config: &ProjectConfig) -> Result<Self> {
        let base_ufo = base_ufo.as_ref();
        let base_font = load_ufo(base_ufo)
            .with_context(|| format!("Failed to load base font: {}", base_ufo.display()))?;
        let resources = Resources::load(config)?;
        let base_dir = base_ufo.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(Self::new(base_font, base_dir, config, resources, Toolchain::from_config(config)))
    }

    pub fn base_font(&self) -> &Font {
        &self.base_font
    }

    pub fn queue(&self) -> &BuildQueue {
        &self.queue
    }

    pub fn build_root(&self) -> PathBuf {
        self.base_dir.join(&self.build_dir)
    }

    /// Whether the project's compiler can produce `format`.
    pub fn supports(&self, format: OutputFormat) -> bool {
        self.toolchain.compiler.supports(format)
    }

    /// OpenType binaries written and failed so far by
    /// [`FontProject::generate_font`].
    pub fn otf_report(&self) -> &BatchReport {
        &self.otf_report
    }

    /// Build one instance, save it as a UFO and queue it for the binary
    /// stage. Returns the saved UFO path.
    pub fn generate_font(
        &mut self,
        source: FontSource<'_>,
        names: &str,
        options: &InstanceOptions,
    ) -> Result<PathBuf> {
        let instance = InstanceNames::parse(names)?;
        info!("Building {}", instance.full_name());

        let mut font = match source {
            FontSource::Mix(mixer) => {
                info!("Mixing masters");
                mixer.mix(&self.base_font).context("Failed to mix masters")?
            }
            FontSource::Font(font) => font.clone(),
        };

        if options.italic {
            info!("Italicizing");
            self.italicize(&mut font, names, options.stem_width)?;
        }

        for suffix in &options.swap_suffixes {
            let swapped = swap_suffixed(&mut font, suffix);
            debug!("Swapped {swapped} glyphs with suffix '{suffix}'");
        }

        info!("Decomposing");
        decompose_glyphs(&mut font, &self.glyphs.predecompose, self.toolchain.decomposer.as_ref())
            .context("Failed to decompose glyphs")?;

        info!("Generating glyphs");
        generate_glyphs(
            &mut font,
            &self.resources.diacritics,
            &self.resources.codepoints,
            self.toolchain.generator.as_ref(),
        )?;

        info!("Copying features");
        font.features = self.base_font.features.clone();

        info!("Decomposing");
        decompose_glyphs(&mut font, &self.glyphs.decompose, self.toolchain.decomposer.as_ref())
            .context("Failed to decompose glyphs")?;

        instance.apply(&mut font.info, &self.foundry, &self.version)?;

        if !self.compatible {
            info!("Removing overlaps");
            remove_overlaps(&mut font, self.toolchain.resolver.as_ref())
                .context("Failed to remove overlaps")?;
        }
        let deleted = delete_glyphs(&mut font, &self.glyphs.delete);
        debug!("Deleted {deleted} glyphs");

        info!("Generating font files");
        let build_root = self.build_root();
        let ufo_path = output_path(&build_root, &font, "ufo")?;
        FontFile::new(&ufo_path).write_ufo(&font)?;
        self.queue.push(QueuedFont::new(&ufo_path));

        if self.build_otf {
            info!("Generating OTF file");
            match self.generate_otf(&ufo_path) {
                Ok(path) => self.otf_report.succeeded.push(path),
                Err(e) => {
                    error!("{}: {e:#}", ufo_path.display());
                    self.otf_report.failed.push((ufo_path.clone(), format!("{e:#}")));
                }
            }
        }

        Ok(ufo_path)
    }

    /// Compile the saved UFO at `ufo_path` to OpenType.
    fn generate_otf(&self, ufo_path: &Path) -> Result<PathBuf> {
        let saved = load_ufo(ufo_path)
            .with_context(|| format!("Failed to reopen UFO: {}", ufo_path.display()))?;
        let format = OutputFormat::OpenType;
        let otf_path = output_path(&self.build_root(), &saved, format.extension())?;
        self.write_binary(&saved, &otf_path, format)?;
        Ok(otf_path)
    }

    fn italicize(&self, font: &mut Font, names: &str, stem_width: f64) -> Result<()> {
        let params = ItalicParams::for_instance(names, stem_width);
        let less_italic: HashSet<&str> = self.glyphs.less_italic.iter().map(String::as_str).collect();
        let no_italic: HashSet<&str> = self.glyphs.no_italic.iter().map(String::as_str).collect();
        let toolchain = &self.toolchain;

        for glyph in font.iter_mut() {
            if glyph.name == PLACEHOLDER_GLYPH {
                continue;
            }
            remove_glyph_overlap(glyph, toolchain.resolver.as_ref())?;

            let angle = if less_italic.contains(glyph.name.as_str()) {
                Some(REDUCED_ANGLE)
            } else if no_italic.contains(glyph.name.as_str()) {
                None
            } else {
                Some(FULL_ANGLE)
            };
            if let Some(angle) = angle {
                toolchain
                    .italicizer
                    .italicize(glyph, angle, &params)
                    .with_context(|| format!("Failed to italicize glyph '{}'", glyph.name))?;
            }

            if glyph.width != 0.0 {
                glyph.width += ITALIC_WIDEN;
            }
        }

        let selection = font.info.open_type_os2_selection.get_or_insert_with(Vec::new);
        if !selection.contains(&OBLIQUE_SELECTION_BIT) {
            selection.push(OBLIQUE_SELECTION_BIT);
        }
        Ok(())
    }

    fn glyph_order_for(&self, path: &Path) -> &[String] {
        if path.to_string_lossy().contains("Thin") {
            &self.resources.glyph_order_thin
        } else {
            &self.resources.glyph_order
        }
    }

    /// Compile, check that the result parses, then write atomically.
    fn write_binary(&self, font: &Font, path: &Path, format: OutputFormat) -> Result<()> {
        let data = self
            .toolchain
            .compiler
            .compile(font, self.glyph_order_for(path), format)
            .with_context(|| format!("Failed to compile: {}", path.display()))?;
        FontRef::new(&data)
            .with_context(|| format!("Compiled font does not parse: {}", path.display()))?;
        FontFile::new(path).write(&data)
    }

    /// Convert and compile every queued instance to TrueType.
    ///
    /// The queue is emptied before any work starts. Curve conversion
    /// failures abort the batch; a font that fails to compile is reported
    /// and the others still build.
    pub fn generate_ttfs(&mut self) -> Result<BatchReport> {
        let queued = self.queue.drain();
        if queued.is_empty() {
            return Ok(BatchReport::default());
        }

        let mut fonts = queued
            .iter()
            .map(|q| {
                load_ufo(&q.path)
                    .with_context(|| format!("Failed to reopen UFO: {}", q.path.display()))
            })
            .collect::<Result<Vec<_>>>()?;

        info!("Converting curves to quadratic");
        let converter = self.toolchain.converter.as_ref();
        if self.compatible {
            converter
                .to_quadratic(&mut fonts, MAX_ERR_EM, true)
                .context("Failed to convert curves")?;
        } else {
            fonts.par_iter_mut().zip(&queued).try_for_each(|(font, q)| {
                converter
                    .to_quadratic(std::slice::from_mut(font), MAX_ERR_EM, true)
                    .with_context(|| format!("Failed to convert curves: {}", q.path.display()))
            })?;
        }

        info!("Generating TTF files");
        let build_root = self.build_root();
        let format = OutputFormat::TrueType;
        let results: Vec<(PathBuf, Result<PathBuf>)> = fonts
            .par_iter()
            .zip(&queued)
            .map(|(font, q)| {
                let result = output_path(&build_root, font, format.extension())
                    .and_then(|path| self.write_binary(font, &path, format).map(|()| path));
                (q.path.clone(), result)
            })
            .collect();

        let mut report = BatchReport::default();
        for (source, result) in results {
            match result {
                Ok(path) => report.succeeded.push(path),
                Err(e) => {
                    error!("{}: {e:#}", source.display());
                    report.failed.push((source, format!("{e:#}")));
                }
            }
        }
        info!("{} of {} TTF files written", report.succeeded.len(), report.total());
        Ok(report)
    }
}
