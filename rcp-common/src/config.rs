// rcp-common/src/config.rs
use std::env;
use std::path::{self, PathBuf};

use directories::UserDirs;
use tracing::debug;

use super::error::{RcpError, Result};

const DEFAULT_ROOT_DIRNAME: &str = ".rcp";
const INDEX_FILENAME: &str = "index.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub rcp_root: PathBuf,
    pub index_url: Option<String>,
    pub cmake_program: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self> {
        debug!("Loading rcp configuration");

        let rcp_root = env::var("RCP_ROOT")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                let fallback = home_dir().join(DEFAULT_ROOT_DIRNAME);
                debug!(
                    "RCP_ROOT not set or empty, falling back to default: {}",
                    fallback.display()
                );
                fallback
            });
        // package roots end up in cmake arguments run from the build dir
        let rcp_root = path::absolute(&rcp_root).map_err(|e| {
            RcpError::Config(format!("Cannot resolve RCP_ROOT {}: {e}", rcp_root.display()))
        })?;
        debug!("Effective RCP_ROOT set to: {}", rcp_root.display());

        let index_url = env::var("RCP_INDEX_URL").ok().filter(|s| !s.is_empty());
        let cmake_program = env::var("RCP_CMAKE")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            rcp_root,
            index_url,
            cmake_program,
        })
    }

    /// Configuration rooted at an explicit directory, ignoring the environment.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            rcp_root: root.into(),
            index_url: None,
            cmake_program: None,
        }
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.rcp_root.join("cache")
    }

    pub fn packages_dir(&self) -> PathBuf {
        self.rcp_root.join("packages")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.rcp_root.join("logs")
    }

    pub fn index_filename(&self) -> &'static str {
        INDEX_FILENAME
    }

    pub fn index_path(&self) -> PathBuf {
        self.cache_dir().join(INDEX_FILENAME)
    }

    pub fn package_version_dir(&self, name: &str, version: &str) -> PathBuf {
        self.packages_dir().join(name).join(version)
    }
}

fn home_dir() -> PathBuf {
    UserDirs::new().map_or_else(|| PathBuf::from("/"), |ud| ud.home_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_hang_off_the_root() {
        let config = Config::with_root("/tmp/rcp-root");
        assert_eq!(config.cache_dir(), PathBuf::from("/tmp/rcp-root/cache"));
        assert_eq!(
            config.index_path(),
            PathBuf::from("/tmp/rcp-root/cache/index.json")
        );
        assert_eq!(
            config.package_version_dir("fftw", "3.3.10"),
            PathBuf::from("/tmp/rcp-root/packages/fftw/3.3.10")
        );
        assert_eq!(config.logs_dir(), PathBuf::from("/tmp/rcp-root/logs"));
    }
}
