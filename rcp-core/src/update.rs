//! Refreshing the cached package index.
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use rcp_common::cache::Cache;
use rcp_common::config::Config;
use rcp_common::error::{RcpError, Result};
use rcp_common::index::PackageIndex;
use tracing::{debug, info};

const USER_AGENT: &str = concat!("rcp/", env!("CARGO_PKG_VERSION"));
const FETCH_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexSource {
    Url(String),
    File(PathBuf),
}

pub fn fetch_index(source: &IndexSource) -> Result<String> {
    match source {
        IndexSource::Url(url) => {
            debug!("Fetching package index from {}", url);
            let client = reqwest::blocking::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(FETCH_TIMEOUT)
                .build()?;
            let response = client.get(url).send()?;
            if !response.status().is_success() {
                return Err(RcpError::Generic(format!(
                    "Failed to fetch package index from {url}: HTTP status {}",
                    response.status()
                )));
            }
            Ok(response.text()?)
        }
        IndexSource::File(path) => {
            debug!("Reading package index from {}", path.display());
            fs::read_to_string(path).map_err(|e| {
                RcpError::NotFound(format!("Cannot read index file {}: {e}", path.display()))
            })
        }
    }
}

/// Fetches, validates and caches the index. Returns the number of packages.
pub fn update_index(cache: &Cache, config: &Config, source: &IndexSource) -> Result<usize> {
    let raw = fetch_index(source)?;
    // refuse to replace a good cache with something unparsable
    let index = PackageIndex::from_json(&raw)?;
    cache.store_raw(config.index_filename(), &raw)?;
    info!("Cached package index with {} packages", index.len());
    Ok(index.len())
}
