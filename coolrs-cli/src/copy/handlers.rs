use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;

use coolrs_io::ParquetStore;
use coolrs_matrix::{Cool, CoolConfig, LoadOptions, SaveOptions};

fn config_from_matches(matches: &ArgMatches) -> Result<CoolConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => CoolConfig::try_from(Path::new(path))
            .with_context(|| format!("Failed to read config {}", path))?,
        None => CoolConfig::default(),
    };

    if matches.get_flag("enforce-integer") {
        config.enforce_integer = true;
    }
    if let Some(&chunk_size) = matches.get_one::<usize>("chunk-size") {
        config.chunk_size = Some(chunk_size);
    }

    Ok(config)
}

pub fn run_copy(matches: &ArgMatches) -> Result<()> {
    let input = matches
        .get_one::<String>("input")
        .expect("An input uri is required.");
    let output = matches
        .get_one::<String>("output")
        .expect("An output uri is required.");

    let config = config_from_matches(matches)?;
    let correction = !matches.get_flag("no-correction");

    let mut load = LoadOptions {
        apply_correction: correction,
        ..LoadOptions::default()
    };
    if let Some(region) = matches.get_one::<String>("region") {
        load = load.with_region(region.as_str());
    }

    let save = SaveOptions {
        symmetric: !matches.get_flag("asymmetric"),
        apply_correction: correction,
        count_type: None,
    };

    let mut store = ParquetStore::new();
    let cool = Cool::with_config(input, config);

    let data = cool
        .load(&store, &load)
        .with_context(|| format!("Failed to load {}", input))?;
    info!(
        "Loaded {} bins and {} pixels from {}",
        data.bins.len(),
        data.matrix.nnz(),
        input
    );

    let written = cool
        .save(&mut store, &data, output, &save)
        .with_context(|| format!("Failed to save {}", output))?;
    info!(
        "Wrote {} pixels as {} to {}",
        written.nonzero_count, written.count_type, output
    );

    Ok(())
}
