//! Resolve, generate, then hand off to the build trigger.
use std::path::{Path, PathBuf};

use rcp_common::config::Config;
use rcp_common::dependency::{DependencyResolver, ResolutionContext, ResolvedGraph};
use rcp_common::error::Result;
use rcp_common::index::PackageIndex;
use rcp_common::manifest::Manifest;
use rcp_common::store::PackageStore;
use tracing::{debug, instrument};

use crate::build::{BuildConfig, BuildDriver, BuildPlan, BuildTrigger};
use crate::generator;

#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineFlags {
    /// Resolve even when packages are missing from the local store.
    pub allow_missing: bool,
}

#[derive(Debug)]
pub struct InstallOutcome {
    pub graph: ResolvedGraph,
    pub generated: Vec<PathBuf>,
}

#[derive(Debug)]
pub struct BuildOutcome {
    pub graph: ResolvedGraph,
    pub generated: Vec<PathBuf>,
    pub plan: BuildPlan,
}

pub fn resolve(
    manifest: &Manifest,
    config: &Config,
    index: &PackageIndex,
    flags: &PipelineFlags,
) -> Result<ResolvedGraph> {
    let store = PackageStore::new(config.clone());
    DependencyResolver::new(ResolutionContext {
        index,
        store: &store,
        require_installed: !flags.allow_missing,
    })
    .resolve(manifest)
}

/// Resolves the manifest and writes its generators into `out_dir`.
#[instrument(skip_all, fields(package = %manifest.identity()))]
pub fn install(
    manifest: &Manifest,
    config: &Config,
    index: &PackageIndex,
    out_dir: &Path,
    flags: &PipelineFlags,
) -> Result<InstallOutcome> {
    let graph = resolve(manifest, config, index, flags)?;
    let generated = generator::write_all(manifest.generators(), &graph, out_dir)?;
    debug!("Generated {:?}", generated);
    Ok(InstallOutcome { graph, generated })
}

/// Resolution, generation into the build dir, then configure and build.
/// Nothing is configured when resolution fails.
#[instrument(skip_all, fields(package = %manifest.identity()))]
pub fn build<D: BuildDriver>(
    manifest: &Manifest,
    config: &Config,
    index: &PackageIndex,
    build_config: &BuildConfig,
    driver: &D,
    flags: &PipelineFlags,
) -> Result<BuildOutcome> {
    let InstallOutcome { graph, generated } =
        install(manifest, config, index, &build_config.build_dir, flags)?;
    let plan = BuildTrigger::new(driver, &graph, build_config).build()?;
    Ok(BuildOutcome {
        graph,
        generated,
        plan,
    })
}
