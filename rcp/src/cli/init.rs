//! Contains the logic for the `init` command.
use std::fs;
use std::path::PathBuf;

use colored::Colorize;
use rcp_common::error::{RcpError, Result};
use rcp_common::manifest::{DEFAULT_MANIFEST, MANIFEST_FILENAME};
use tracing::debug;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to write rcp.toml into
    #[arg(long, default_value = ".")]
    pub path: PathBuf,

    /// Overwrite an existing rcp.toml
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub fn run(&self) -> Result<()> {
        let target = self.path.join(MANIFEST_FILENAME);
        if target.exists() && !self.force {
            return Err(RcpError::Config(format!(
                "{} already exists (use --force to overwrite)",
                target.display()
            )));
        }

        fs::create_dir_all(&self.path)?;
        fs::write(&target, DEFAULT_MANIFEST)?;
        debug!("Wrote default manifest to {}", target.display());
        println!("{} {}", "Created".green().bold(), target.display());
        Ok(())
    }
}
