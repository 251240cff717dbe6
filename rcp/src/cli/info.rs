//! Contains the logic for the `info` command.
use std::path::PathBuf;

use colored::Colorize;
use prettytable::{format, Cell, Row, Table};
use rcp_common::config::Config;
use rcp_common::error::{RcpError, Result};
use rcp_common::index::PackageIndex;
use rcp_common::manifest::{PackageReference, MANIFEST_FILENAME};
use tracing::debug;

use crate::cli::{load_index, load_manifest};

#[derive(clap::Args, Debug)]
pub struct Info {
    /// Path to the recipe manifest
    #[arg(long, default_value = MANIFEST_FILENAME)]
    pub manifest: PathBuf,
}

impl Info {
    pub fn run(&self, config: &Config) -> Result<()> {
        let manifest = load_manifest(&self.manifest)?;
        // info still works without a cached index
        let index = match load_index(config) {
            Ok(index) => Some(index),
            Err(e) => {
                debug!("No usable package index: {}", e);
                None
            }
        };

        println!(
            "{} {}",
            "Package".bold(),
            manifest.identity().to_string().blue().bold()
        );

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
        table.add_row(Row::new(vec![
            Cell::new("Requires").style_spec("b"),
            Cell::new("Version").style_spec("b"),
            Cell::new("Index").style_spec("b"),
        ]));
        for reference in manifest.requires() {
            table.add_row(Row::new(vec![
                Cell::new(&reference.name).style_spec("Fb"),
                Cell::new(&reference.version),
                index_cell(index.as_ref(), reference),
            ]));
        }
        table.printstd();

        if !manifest.options().is_empty() {
            println!("{}", "Options".bold());
            for (key, value) in manifest.options().iter() {
                println!("  {key} = {value}");
            }
        }

        let generators: Vec<&str> = manifest.generators().iter().map(|g| g.as_str()).collect();
        println!("{} {}", "Generators".bold(), generators.join(", "));
        Ok(())
    }
}

fn index_cell(index: Option<&PackageIndex>, reference: &PackageReference) -> Cell {
    let Some(index) = index else {
        return Cell::new("-");
    };
    match index.lookup(reference) {
        Ok(_) => Cell::new("ok").style_spec("Fg"),
        Err(RcpError::UnknownVersion { .. }) => Cell::new("unknown version").style_spec("Fr"),
        Err(_) => Cell::new("unknown package").style_spec("Fr"),
    }
}
