//! Build-system input files describing the resolved dependencies.
use std::fs;
use std::path::{Path, PathBuf};

use rcp_common::dependency::ResolvedGraph;
use rcp_common::error::Result;
use rcp_common::manifest::GeneratorKind;
use tracing::{debug, info};

pub mod cmake;
pub mod json;

pub const CMAKE_BUILDINFO: &str = "rcpbuildinfo.cmake";
pub const JSON_BUILDINFO: &str = "rcpbuildinfo.json";

pub fn output_filename(kind: GeneratorKind) -> &'static str {
    match kind {
        GeneratorKind::Cmake => CMAKE_BUILDINFO,
        GeneratorKind::Json => JSON_BUILDINFO,
    }
}

/// Writes one generator's output into `out_dir`, returning the file path.
pub fn generate(kind: GeneratorKind, graph: &ResolvedGraph, out_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)?;
    let contents = match kind {
        GeneratorKind::Cmake => cmake::render(graph),
        GeneratorKind::Json => json::render(graph)?,
    };
    let path = out_dir.join(output_filename(kind));
    fs::write(&path, contents)?;
    info!("Generator {} created {}", kind, path.display());
    Ok(path)
}

pub fn write_all(
    kinds: &[GeneratorKind],
    graph: &ResolvedGraph,
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    if kinds.is_empty() {
        debug!("No generators declared; nothing to write.");
    }
    kinds
        .iter()
        .map(|kind| generate(*kind, graph, out_dir))
        .collect()
}

/// Upper-cased package/option name with every non-alphanumeric mapped to `_`,
/// used in generated variable names (`gsl-lite` -> `GSL_LITE`).
pub fn var_suffix(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Path spelled with forward slashes, which CMake accepts on every platform.
pub fn cmake_path(path: &Path) -> String {
    path.display().to_string().replace('\\', "/")
}
