use anyhow::{Context, Result};
use clap::ArgMatches;

use coolrs_io::{ParquetStore, Store};

pub fn run_ls(matches: &ArgMatches) -> Result<()> {
    let path = matches
        .get_one::<String>("path")
        .expect("A store path is required.");

    let nodes = ParquetStore::new()
        .list_nodes(path)
        .with_context(|| format!("Failed to list nodes of {}", path))?;

    for node in nodes {
        println!("{}::{}", path, node);
    }

    Ok(())
}
