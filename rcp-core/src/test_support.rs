//! Fixtures shared by the unit tests in this crate.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rcp_common::dependency::{ResolutionStatus, ResolvedGraph, ResolvedPackage};
use rcp_common::manifest::{Manifest, OptionValue, PackageReference, DEFAULT_MANIFEST};

pub const SAMPLE_INDEX: &str = r#"[
    {
        "name": "fftw",
        "versions": [
            {
                "version": "3.3.10",
                "options": { "shared": { "values": [true, false], "default": true } },
                "lib_dirs": ["lib"],
                "libs": ["fftw3"]
            }
        ]
    },
    {
        "name": "gsl-lite",
        "versions": [ { "version": "0.40.0", "header_only": true } ]
    }
]"#;

/// The resolved graph of the default recipe, rooted under `store_root`.
pub fn sample_graph(store_root: &Path) -> ResolvedGraph {
    let manifest: Manifest = DEFAULT_MANIFEST.parse().expect("default manifest parses");

    let fftw_root = store_root.join("packages/fftw/3.3.10/0123456789abcdef");
    let mut fftw_options = BTreeMap::new();
    fftw_options.insert("shared".to_string(), OptionValue::Bool(false));
    let fftw = ResolvedPackage {
        reference: PackageReference::new("fftw", "3.3.10"),
        direct: true,
        header_only: false,
        options: fftw_options,
        package_id: "0123456789abcdef".to_string(),
        include_dirs: vec![fftw_root.join("include")],
        lib_dirs: vec![fftw_root.join("lib")],
        libs: vec!["fftw3".to_string()],
        defines: Vec::new(),
        requires: Vec::new(),
        root: fftw_root,
        status: ResolutionStatus::Installed,
    };

    let gsl_root = store_root.join("packages/gsl-lite/0.40.0/fedcba9876543210");
    let gsl = ResolvedPackage {
        reference: PackageReference::new("gsl-lite", "0.40.0"),
        direct: true,
        header_only: true,
        options: BTreeMap::new(),
        package_id: "fedcba9876543210".to_string(),
        include_dirs: vec![gsl_root.join("include")],
        lib_dirs: Vec::<PathBuf>::new(),
        libs: Vec::new(),
        defines: Vec::new(),
        requires: Vec::new(),
        root: gsl_root,
        status: ResolutionStatus::Installed,
    };

    ResolvedGraph {
        root: manifest.identity().clone(),
        packages: vec![fftw, gsl],
        overrides: manifest.options().clone(),
    }
}
