//! Build driver: every configured instance, then the TTF batch.

use std::{path::PathBuf, time::Instant};

use anyhow::{Result, bail};
use fontbuild_font_compiler::OutputFormat;
use log::warn;

use crate::{
    config::{InstanceConfig, ProjectConfig},
    mix::LinearMix,
    project::{BatchReport, FontProject, FontSource, InstanceOptions},
};

const RULE: &str =
    "═══════════════════════════════════════════════════════════════════════════════";

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub config: PathBuf,
    /// Base UFO; outputs go under `<its directory>/<build_dir>`.
    pub base: PathBuf,
    pub build_dir: PathBuf,
    pub compatible: bool,
    pub build_otf: bool,
    pub skip_ttf: bool,
}

pub fn run_step<T>(
    name: &str,
    step_num: usize,
    total: usize,
    f: impl FnOnce() -> Result<T>,
) -> Result<T> {
    println!("\n[{step_num}/{total}] {name}");
    let start = Instant::now();
    let value = f()?;
    println!("  ✓ {name} ({:.2}s)", start.elapsed().as_secs_f64());
    Ok(value)
}

fn build_instance(
    project: &mut FontProject,
    config: &ProjectConfig,
    instance: &InstanceConfig,
) -> Result<PathBuf> {
    let options = InstanceOptions {
        italic: instance.italic,
        swap_suffixes: instance.swap_suffixes.clone(),
        stem_width: instance.stem_width,
    };
    match &instance.mix {
        Some(mix) => {
            let [a, b] = &mix.masters;
            let mixer = LinearMix::load(config.resolve(a), config.resolve(b), mix.factor.xy())?;
            project.generate_font(FontSource::Mix(&mixer), &instance.name, &options)
        }
        None => {
            let base = project.base_font().clone();
            project.generate_font(FontSource::Font(&base), &instance.name, &options)
        }
    }
}

/// Build every `[[instance]]` of the configuration, then compile the TTF
/// batch unless `skip_ttf` is set.
///
/// A font whose OTF or TTF fails to compile does not stop the others; the
/// build reports the failures once everything else is written.
pub fn build(options: &BuildOptions) -> Result<BatchReport> {
    let start = Instant::now();
    let config = ProjectConfig::load(&options.config)?;
    let mut project = FontProject::open(&options.base, &config)?;
    project.build_dir = options.build_dir.clone();
    project.compatible = options.compatible;
    project.build_otf = options.build_otf;
    if options.build_otf && !project.supports(OutputFormat::OpenType) {
        bail!("The configured font compiler cannot produce OpenType output; build without --otf");
    }

    println!("{RULE}");
    println!("Font Instance Build Pipeline");
    println!("{RULE}");

    if config.instances.is_empty() {
        warn!("No [[instance]] entries in {}", options.config.display());
    }
    let total = config.instances.len() + usize::from(!options.skip_ttf);

    for (i, instance) in config.instances.iter().enumerate() {
        run_step(&instance.name, i + 1, total, || build_instance(&mut project, &config, instance))?;
    }

    let report = if options.skip_ttf {
        BatchReport::default()
    } else {
        run_step("Generate TTF files", total, total, || project.generate_ttfs())?
    };

    println!("\n{RULE}");
    println!("✨ Build complete in {:.2}s", start.elapsed().as_secs_f64());
    println!("   Output: {}", project.build_root().display());
    println!("   Instances: {}", config.instances.len());
    if !options.skip_ttf {
        println!("   TTF: {} written, {} failed", report.succeeded.len(), report.failed.len());
    }
    let otf = project.otf_report();
    if options.build_otf {
        println!("   OTF: {} written, {} failed", otf.succeeded.len(), otf.failed.len());
    }
    println!("{RULE}");

    if !otf.all_succeeded() {
        bail!("OTF generation failed for {} fonts", otf.failed.len());
    }
    if !report.all_succeeded() {
        bail!("TTF generation failed for {} fonts", report.failed.len());
    }
    Ok(report)
}
