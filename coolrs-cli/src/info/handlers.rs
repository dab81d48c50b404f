use anyhow::Result;
use clap::ArgMatches;
use serde_json::json;

use coolrs_io::ParquetStore;
use coolrs_matrix::Cool;

pub fn run_info(matches: &ArgMatches) -> Result<()> {
    let uri = matches
        .get_one::<String>("uri")
        .expect("A matrix uri is required.");

    let store = ParquetStore::new();
    let cool = Cool::new(uri);

    let info = cool.info(&store)?;
    let columns = cool.bin_columns(&store)?;

    let mut report = json!({
        "uri": uri,
        "info": info,
        "bin_columns": columns,
    });
    if matches.get_flag("missing-bins") {
        report["missing_bins"] = json!(cool.missing_bin_report(&store)?);
    }
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
