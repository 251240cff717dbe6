//! Contains the logic for the `install` command.
use std::path::PathBuf;

use colored::Colorize;
use rcp_common::config::Config;
use rcp_common::dependency::{ResolutionStatus, ResolvedGraph};
use rcp_common::error::Result;
use rcp_common::manifest::MANIFEST_FILENAME;
use rcp_core::pipeline::{self, PipelineFlags};

use crate::cli::{load_index, load_manifest};

#[derive(clap::Args, Debug)]
pub struct InstallArgs {
    /// Path to the recipe manifest
    #[arg(long, default_value = MANIFEST_FILENAME)]
    pub manifest: PathBuf,

    /// Directory the generated build-system input is written to
    #[arg(long, default_value = "build")]
    pub build_dir: PathBuf,

    /// Resolve even when packages are not present in the local store
    #[arg(long)]
    pub allow_missing: bool,
}

impl InstallArgs {
    pub fn run(&self, config: &Config) -> Result<()> {
        let manifest = load_manifest(&self.manifest)?;
        let index = load_index(config)?;
        let flags = PipelineFlags {
            allow_missing: self.allow_missing,
        };

        let outcome = pipeline::install(&manifest, config, &index, &self.build_dir, &flags)?;
        print_graph(&outcome.graph);
        print_generated(&outcome.generated);
        Ok(())
    }
}

pub(crate) fn print_graph(graph: &ResolvedGraph) {
    println!(
        "{} {}",
        "Resolved".green().bold(),
        graph.root.to_string().bold()
    );
    for package in &graph.packages {
        let status = match package.status {
            ResolutionStatus::Installed => "installed".green(),
            ResolutionStatus::Missing => "missing".yellow(),
        };
        println!(
            "  {}/{} [{}] {}",
            package.name().blue(),
            package.version(),
            package.package_id,
            status
        );
    }
}

pub(crate) fn print_generated(paths: &[PathBuf]) {
    for path in paths {
        println!("{} {}", "Generated".green().bold(), path.display());
    }
}
