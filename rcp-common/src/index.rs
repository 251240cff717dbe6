use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::cache::Cache;
use super::error::{RcpError, Result};
use super::manifest::{OptionValue, PackageReference};

/// Allowed values and default for one package option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSpec {
    pub values: Vec<OptionValue>,
    pub default: OptionValue,
}

impl OptionSpec {
    pub fn allows(&self, value: &OptionValue) -> bool {
        self.values.iter().any(|v| v == value)
    }
}

/// One published version of a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexVersion {
    pub version: String,
    #[serde(default)]
    pub header_only: bool,
    #[serde(default)]
    pub options: BTreeMap<String, OptionSpec>,
    #[serde(default = "default_include_dirs")]
    pub include_dirs: Vec<PathBuf>,
    #[serde(default)]
    pub lib_dirs: Vec<PathBuf>,
    #[serde(default)]
    pub libs: Vec<String>,
    #[serde(default)]
    pub defines: Vec<String>,
    #[serde(default)]
    pub requires: Vec<PackageReference>,
}

fn default_include_dirs() -> Vec<PathBuf> {
    vec![PathBuf::from("include")]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexPackage {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub versions: Vec<IndexVersion>,
}

/// The package index: every package and version resolution may pick from.
#[derive(Debug, Clone, Default)]
pub struct PackageIndex {
    packages: HashMap<String, IndexPackage>,
}

impl PackageIndex {
    pub fn from_packages(packages: Vec<IndexPackage>) -> Self {
        let mut map = HashMap::new();
        for package in packages {
            if map.contains_key(&package.name) {
                warn!(
                    "Package '{}' listed more than once in the index; keeping the first entry.",
                    package.name
                );
                continue;
            }
            map.insert(package.name.clone(), package);
        }
        Self { packages: map }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let packages: Vec<IndexPackage> = serde_json::from_str(raw)
            .map_err(|e| RcpError::Cache(format!("Failed to parse package index: {e}")))?;
        debug!("Parsed {} index packages.", packages.len());
        Ok(Self::from_packages(packages))
    }

    /// Loads the cached index, warning when it is older than the cache TTL.
    pub fn load(cache: &Cache, filename: &str) -> Result<Self> {
        let raw = cache.load_raw(filename)?;
        if !cache.is_cache_valid(filename)? {
            warn!("Package index is stale; run 'rcp update' to refresh it.");
        }
        Self::from_json(&raw)
    }

    pub fn package(&self, name: &str) -> Option<&IndexPackage> {
        self.packages.get(name)
    }

    pub fn lookup(&self, reference: &PackageReference) -> Result<&IndexVersion> {
        let package = self
            .package(&reference.name)
            .ok_or_else(|| RcpError::UnknownPackage(reference.name.clone()))?;
        package
            .versions
            .iter()
            .find(|v| v.version == reference.version)
            .ok_or_else(|| RcpError::UnknownVersion {
                name: reference.name.clone(),
                version: reference.version.clone(),
                available: package.versions.iter().map(|v| v.version.clone()).collect(),
            })
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}
