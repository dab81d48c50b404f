mod copy;
mod info;
mod ls;

use anyhow::Result;
use clap::{ArgAction, ArgMatches, Command, arg};
use env_logger::{Builder, Env};
use log::LevelFilter;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PKG_NAME: &str = "coolrs";
    pub const BIN_NAME: &str = "coolrs";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .author("Databio")
        .about("Inspect and copy genome contact matrices stored in chunked columnar files.")
        .subcommand_required(true)
        .arg(arg!(-v --verbose "Print debug output").action(ArgAction::SetTrue).global(true))
        .subcommand(ls::cli::create_ls_cli())
        .subcommand(info::cli::create_info_cli())
        .subcommand(copy::cli::create_copy_cli())
}

fn init_logging(matches: &ArgMatches) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    if matches.get_flag("verbose") {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.format_timestamp_secs();
    builder.init();
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();
    init_logging(&matches);

    match matches.subcommand() {
        //
        // LS
        //
        Some((ls::cli::LS_CMD, matches)) => {
            ls::handlers::run_ls(matches)?;
        }

        //
        // INFO
        //
        Some((info::cli::INFO_CMD, matches)) => {
            info::handlers::run_info(matches)?;
        }

        //
        // COPY
        //
        Some((copy::cli::COPY_CMD, matches)) => {
            copy::handlers::run_copy(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}
