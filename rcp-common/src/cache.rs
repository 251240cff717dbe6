// rcp-common/src/cache.rs
//! On-disk cache for downloaded index documents, under `<root>/cache`.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use tracing::debug;

use super::error::{RcpError, Result};
use crate::Config;

/// A cached index older than this is reported as stale.
const INDEX_TTL: Duration = Duration::from_secs(24 * 60 * 60);

pub struct Cache {
    cache_dir: PathBuf,
}

impl Cache {
    pub fn new(config: &Config) -> Result<Self> {
        let cache_dir = config.cache_dir();
        fs::create_dir_all(&cache_dir)?;
        Ok(Self { cache_dir })
    }

    pub fn store_raw(&self, filename: &str, data: &str) -> Result<()> {
        let path = self.cache_dir.join(filename);
        debug!("Writing {} bytes to {}", data.len(), path.display());
        fs::write(&path, data)?;
        Ok(())
    }

    /// Contents of a cached document; a missing file asks for `rcp update`.
    pub fn load_raw(&self, filename: &str) -> Result<String> {
        let path = self.cache_dir.join(filename);
        debug!("Reading cached {}", path.display());
        if !path.is_file() {
            return Err(RcpError::Cache(format!(
                "{filename} is not cached yet (run 'rcp update' first)"
            )));
        }
        fs::read_to_string(&path)
            .map_err(|e| RcpError::Cache(format!("Cannot read {}: {e}", path.display())))
    }

    /// Whether `filename` exists and was written within the TTL.
    pub fn is_cache_valid(&self, filename: &str) -> Result<bool> {
        let path = self.cache_dir.join(filename);
        let Ok(metadata) = fs::metadata(&path) else {
            return Ok(false);
        };
        let age = SystemTime::now()
            .duration_since(metadata.modified()?)
            .map_err(|e| RcpError::Cache(format!("Clock went backwards: {e}")))?;
        Ok(age <= INDEX_TTL)
    }
}
