//! Contains the logic for the `build` command.
use std::path::PathBuf;

use colored::Colorize;
use rcp_common::config::Config;
use rcp_common::error::Result;
use rcp_common::manifest::MANIFEST_FILENAME;
use rcp_core::build::{BuildConfig, BuildType, CMakeDriver};
use rcp_core::pipeline::{self, PipelineFlags};
use tracing::debug;

use crate::cli::install::{print_generated, print_graph};
use crate::cli::{load_index, load_manifest, manifest_dir};

#[derive(clap::Args, Debug)]
pub struct BuildArgs {
    /// Path to the recipe manifest
    #[arg(long, default_value = MANIFEST_FILENAME)]
    pub manifest: PathBuf,

    /// CMake source directory (defaults to the manifest's directory)
    #[arg(long)]
    pub source_dir: Option<PathBuf>,

    /// CMake build directory (defaults to <source-dir>/build)
    #[arg(long)]
    pub build_dir: Option<PathBuf>,

    /// Debug, Release, RelWithDebInfo or MinSizeRel
    #[arg(long, default_value_t = BuildType::Release)]
    pub build_type: BuildType,

    /// CMake generator, e.g. "Ninja"
    #[arg(short = 'G', long)]
    pub generator: Option<String>,

    /// Parallel build jobs (defaults to the number of CPUs)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Extra cache entries passed to configure as -DKEY=VALUE
    #[arg(short = 'D', value_name = "KEY=VALUE", value_parser = parse_define)]
    pub defines: Vec<(String, String)>,

    /// cmake executable to use (defaults to RCP_CMAKE, then PATH)
    #[arg(long)]
    pub cmake: Option<PathBuf>,

    /// Resolve even when packages are not present in the local store
    #[arg(long)]
    pub allow_missing: bool,
}

fn parse_define(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

impl BuildArgs {
    fn build_config(&self) -> BuildConfig {
        let source_dir = self
            .source_dir
            .clone()
            .unwrap_or_else(|| manifest_dir(&self.manifest));
        let build_dir = self
            .build_dir
            .clone()
            .unwrap_or_else(|| source_dir.join("build"));

        let mut build_config = BuildConfig::new(source_dir, build_dir);
        build_config.build_type = self.build_type;
        build_config.generator = self.generator.clone();
        build_config.jobs = Some(self.jobs.unwrap_or_else(num_cpus::get));
        build_config.defines = self.defines.clone();
        build_config
    }

    fn driver(&self, config: &Config) -> CMakeDriver {
        match self.cmake.as_ref().or(config.cmake_program.as_ref()) {
            Some(program) => CMakeDriver::with_program(program),
            None => CMakeDriver::new(),
        }
    }

    pub fn run(&self, config: &Config) -> Result<()> {
        let manifest = load_manifest(&self.manifest)?;
        let index = load_index(config)?;
        let build_config = self.build_config();
        debug!("Build configuration: {:?}", build_config);

        let flags = PipelineFlags {
            allow_missing: self.allow_missing,
        };
        let outcome = pipeline::build(
            &manifest,
            config,
            &index,
            &build_config,
            &self.driver(config),
            &flags,
        )?;

        print_graph(&outcome.graph);
        print_generated(&outcome.generated);
        println!(
            "{} {} ({}) in {}",
            "Built".green().bold(),
            manifest.identity().to_string().bold(),
            outcome.plan.build_type,
            outcome.plan.build_dir().display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn args(manifest: &str) -> BuildArgs {
        BuildArgs {
            manifest: PathBuf::from(manifest),
            source_dir: None,
            build_dir: None,
            build_type: BuildType::Release,
            generator: None,
            jobs: None,
            defines: Vec::new(),
            cmake: None,
            allow_missing: false,
        }
    }

    #[test]
    fn defines_need_a_key() {
        assert_eq!(
            parse_define("A=b=c").unwrap(),
            ("A".to_string(), "b=c".to_string())
        );
        assert_eq!(parse_define("EMPTY=").unwrap().1, "");
        assert!(parse_define("=x").is_err());
        assert!(parse_define("NOVALUE").is_err());
    }

    #[test]
    fn directories_default_from_manifest() {
        let config = args("proj/rcp.toml").build_config();
        assert_eq!(config.source_dir, Path::new("proj"));
        assert_eq!(config.build_dir, Path::new("proj/build"));
        assert!(config.jobs.unwrap_or(0) >= 1);

        let mut explicit = args("rcp.toml");
        explicit.build_dir = Some(PathBuf::from("out"));
        explicit.jobs = Some(3);
        let config = explicit.build_config();
        assert_eq!(config.source_dir, Path::new("."));
        assert_eq!(config.build_dir, Path::new("out"));
        assert_eq!(config.jobs, Some(3));
    }
}
