// rcp/src/cli.rs
//! Defines the command-line argument structure using clap.
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use rcp_common::error::Result;
use rcp_common::{Cache, Config, Manifest, PackageIndex};

pub mod build;
pub mod info;
pub mod init;
pub mod install;
pub mod update;

use crate::cli::build::BuildArgs;
use crate::cli::info::Info;
use crate::cli::init::InitArgs;
use crate::cli::install::InstallArgs;
use crate::cli::update::Update;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, name = "rcp", bin_name = "rcp")]
#[command(propagate_version = true)]
pub struct CliArgs {
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write the default rcp.toml recipe
    Init(InitArgs),
    /// Show what a recipe declares
    Info(Info),
    /// Refresh the cached package index
    Update(Update),
    /// Resolve dependencies and generate build-system input
    Install(InstallArgs),
    /// Resolve, generate, then run cmake configure and build
    Build(BuildArgs),
}

impl Command {
    pub fn run(&self, config: &Config) -> Result<()> {
        match self {
            Self::Init(command) => command.run(),
            Self::Info(command) => command.run(config),
            Self::Update(command) => command.run(config),
            Self::Install(command) => command.run(config),
            Self::Build(command) => command.run(config),
        }
    }
}

pub(crate) fn load_manifest(path: &Path) -> Result<Manifest> {
    Manifest::load(path)
}

pub(crate) fn load_index(config: &Config) -> Result<PackageIndex> {
    let cache = Cache::new(config)?;
    PackageIndex::load(&cache, config.index_filename())
}

/// Directory holding the manifest; `.` for a bare file name.
pub(crate) fn manifest_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
