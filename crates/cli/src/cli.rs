//! CLI definitions and command dispatch.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use fontbuild_core::{BuildOptions, build, io::build_root};

use crate::clean::clean;

#[derive(Parser)]
#[command(name = "fontbuild")]
#[command(about = "Build font instances from a UFO source and a project configuration")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, clap::Args)]
pub struct BuildArgs {
    /// Project configuration (TOML)
    #[arg(short, long)]
    pub config: PathBuf,
    /// Base UFO source
    #[arg(short, long)]
    pub base: PathBuf,
    /// Output directory, relative to the base UFO's directory
    #[arg(long, default_value = "out")]
    pub build_dir: PathBuf,
    /// Keep outlines interpolation compatible across instances
    #[arg(long)]
    pub compatible: bool,
    /// Also compile OpenType binaries
    #[arg(long)]
    pub otf: bool,
    /// Stop after writing the UFO sources
    #[arg(long)]
    pub skip_ttf: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    Build {
        #[command(flatten)]
        args: BuildArgs,
    },
    Clean {
        /// Base UFO source the build directory belongs to
        #[arg(short, long)]
        base: PathBuf,
        /// Build directory to remove, relative to the base UFO's directory
        #[arg(long, default_value = "out")]
        build_dir: PathBuf,
    },
}

impl Commands {
    pub fn run(self) -> Result<()> {
        match self {
            Commands::Build { args } => {
                build(&BuildOptions {
                    config: args.config,
                    base: args.base,
                    build_dir: args.build_dir,
                    compatible: args.compatible,
                    build_otf: args.otf,
                    skip_ttf: args.skip_ttf,
                })?;
            }
            Commands::Clean { base, build_dir } => {
                clean(&[build_root(&base, &build_dir).as_path()])?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_build_args() {
        let cli = Cli::parse_from([
            "fontbuild",
            "build",
            "--config",
            "roboto.toml",
            "--base",
            "src/Roboto-Regular.ufo",
            "--compatible",
        ]);
        let Commands::Build { args } = cli.command else {
            panic!("expected build");
        };
        assert_eq!(args.config, PathBuf::from("roboto.toml"));
        assert_eq!(args.build_dir, PathBuf::from("out"));
        assert!(args.compatible);
        assert!(!args.skip_ttf);
    }

    #[test]
    fn test_clean_uses_base_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("src/out");
        std::fs::create_dir_all(out.join("TestUFO")).unwrap();
        let base = dir.path().join("src/Test-Regular.ufo");

        let cli = Cli::parse_from(["fontbuild", "clean", "--base", base.to_str().unwrap()]);
        let Commands::Clean { base: parsed, build_dir } = &cli.command else {
            panic!("expected clean");
        };
        assert_eq!(parsed, &base);
        assert_eq!(build_dir, &PathBuf::from("out"));

        cli.command.run().unwrap();
        assert!(!out.exists());
        assert!(dir.path().join("src").exists());
    }
}
