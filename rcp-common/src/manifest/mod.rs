//! The recipe manifest: package identity, pinned requirements, option
//! overrides and the build-system inputs to generate.
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use tracing::debug;

use crate::error::{RcpError, Result};

pub mod options;
pub mod reference;

pub use options::{OptionKey, OptionOverrides, OptionValue};
pub use reference::{PackageIdentity, PackageReference};

pub const MANIFEST_FILENAME: &str = "rcp.toml";

/// The recipe `rcp init` writes.
pub const DEFAULT_MANIFEST: &str = r#"# Dependencies are resolved against the package index, then
# `rcp build` runs cmake configure followed by cmake build.
requires = ["fftw/3.3.10", "gsl-lite/0.40.0"]
generators = ["cmake"]

[package]
name = "myproject"
version = "1.0"

[options]
"fftw:shared" = false
"#;

/// Build-system input a manifest asks to have generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeneratorKind {
    Cmake,
    Json,
}

impl GeneratorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cmake => "cmake",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeneratorKind {
    type Err = RcpError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cmake" => Ok(Self::Cmake),
            "json" => Ok(Self::Json),
            other => Err(RcpError::ParseError(
                "generators",
                format!("unknown generator '{other}' (expected cmake or json)"),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawManifest {
    #[serde(default)]
    requires: Vec<String>,
    #[serde(default)]
    generators: Vec<String>,
    package: RawPackage,
    #[serde(default)]
    options: BTreeMap<String, OptionValue>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPackage {
    name: String,
    version: String,
}

/// A validated, immutable recipe manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    identity: PackageIdentity,
    requires: Vec<PackageReference>,
    options: OptionOverrides,
    generators: Vec<GeneratorKind>,
}

impl Manifest {
    pub fn new(
        identity: PackageIdentity,
        requires: Vec<PackageReference>,
        options: OptionOverrides,
        generators: Vec<GeneratorKind>,
    ) -> Result<Self> {
        if identity.name().trim().is_empty() {
            return Err(RcpError::ParseError(
                "manifest",
                "package name must not be empty".to_string(),
            ));
        }
        if identity.version().trim().is_empty() {
            return Err(RcpError::ParseError(
                "manifest",
                "package version must not be empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for req in &requires {
            if !seen.insert(req.name.as_str()) {
                return Err(RcpError::ParseError(
                    "manifest",
                    format!("package '{}' is required more than once", req.name),
                ));
            }
        }

        let mut unique_generators = Vec::new();
        for kind in generators {
            if !unique_generators.contains(&kind) {
                unique_generators.push(kind);
            }
        }

        Ok(Self {
            identity,
            requires,
            options,
            generators: unique_generators,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading manifest from {}", path.display());
        let raw = fs::read_to_string(path).map_err(|e| {
            RcpError::NotFound(format!("Cannot read manifest {}: {e}", path.display()))
        })?;
        raw.parse()
    }

    pub fn identity(&self) -> &PackageIdentity {
        &self.identity
    }

    pub fn requires(&self) -> &[PackageReference] {
        &self.requires
    }

    pub fn options(&self) -> &OptionOverrides {
        &self.options
    }

    pub fn generators(&self) -> &[GeneratorKind] {
        &self.generators
    }
}

impl FromStr for Manifest {
    type Err = RcpError;

    fn from_str(s: &str) -> Result<Self> {
        let raw: RawManifest = toml::from_str(s)?;
        let requires = raw
            .requires
            .iter()
            .map(|r| r.parse())
            .collect::<Result<Vec<PackageReference>>>()?;
        let generators = raw
            .generators
            .iter()
            .map(|g| g.parse())
            .collect::<Result<Vec<GeneratorKind>>>()?;
        let options = OptionOverrides::try_from(raw.options)?;

        Self::new(
            PackageIdentity::new(raw.package.name, raw.package.version),
            requires,
            options,
            generators,
        )
    }
}
