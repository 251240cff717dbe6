//! Contains the logic for the `update` command.
use std::path::PathBuf;

use colored::Colorize;
use rcp_common::cache::Cache;
use rcp_common::config::Config;
use rcp_common::error::{RcpError, Result};
use rcp_core::update::{update_index, IndexSource};

#[derive(clap::Args, Debug)]
pub struct Update {
    /// Fetch the index from this URL (defaults to RCP_INDEX_URL)
    #[arg(long, conflicts_with = "file")]
    pub url: Option<String>,

    /// Read the index from a local JSON file
    #[arg(long)]
    pub file: Option<PathBuf>,
}

impl Update {
    fn source(&self, config: &Config) -> Result<IndexSource> {
        if let Some(path) = &self.file {
            return Ok(IndexSource::File(path.clone()));
        }
        self.url
            .clone()
            .or_else(|| config.index_url.clone())
            .map(IndexSource::Url)
            .ok_or_else(|| {
                RcpError::Config(
                    "No index source: pass --url or --file, or set RCP_INDEX_URL".to_string(),
                )
            })
    }

    pub fn run(&self, config: &Config) -> Result<()> {
        let source = self.source(config)?;
        tracing::debug!("Updating package index from {:?}", source);
        println!("Updating package index");

        let cache = Cache::new(config)?;
        let count = update_index(&cache, config, &source)?;
        println!(
            "{} {} packages cached at {}",
            "Updated".green().bold(),
            count,
            config.index_path().display()
        );
        Ok(())
    }
}
