// rcp-common/src/store.rs
use std::collections::BTreeMap;
use std::path::PathBuf;

use sha2::{Digest, Sha256};
use tracing::debug;

use super::config::Config;
use super::manifest::OptionValue;

/// Identifies one binary configuration of a package version: the first 16
/// hex digits of the SHA-256 over the sorted `key=value` option lines.
pub fn package_id(options: &BTreeMap<String, OptionValue>) -> String {
    let mut hasher = Sha256::new();
    for (key, value) in options {
        hasher.update(key.as_bytes());
        hasher.update(b"=");
        hasher.update(value.canonical().as_bytes());
        hasher.update(b"\n");
    }
    let digest = hex::encode(hasher.finalize());
    digest[..16].to_string()
}

/// Local store of binary packages laid out as
/// `<packages_dir>/<name>/<version>/<package_id>`.
#[derive(Debug)]
pub struct PackageStore {
    config: Config,
}

impl PackageStore {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn package_path(&self, name: &str, version: &str, package_id: &str) -> PathBuf {
        self.config.package_version_dir(name, version).join(package_id)
    }

    pub fn is_installed(&self, name: &str, version: &str, package_id: &str) -> bool {
        let path = self.package_path(name, version, package_id);
        let installed = path.is_dir();
        debug!(
            "[STORE:{}] {} at {}",
            name,
            if installed { "installed" } else { "missing" },
            path.display()
        );
        installed
    }
}
