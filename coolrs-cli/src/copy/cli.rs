use clap::{Arg, ArgAction, Command, arg, value_parser};

pub const COPY_CMD: &str = "copy";

pub fn create_copy_cli() -> Command {
    Command::new(COPY_CMD)
        .about("Load a matrix (or one region of it) and save it to a new uri.")
        .arg_required_else_help(true)
        .arg(Arg::new("input").required(true).help("Uri to read from"))
        .arg(Arg::new("output").required(true).help("Uri to write to"))
        .arg(arg!(-r --region <region> "Only copy one region, e.g. chr1 or chr1:1,000,000-2,000,000"))
        .arg(
            arg!(--"no-correction" "Do not apply or revert the correction factors")
                .action(ArgAction::SetTrue),
        )
        .arg(
            arg!(--asymmetric "Store both triangles instead of the upper one")
                .action(ArgAction::SetTrue),
        )
        .arg(
            arg!(--"enforce-integer" "Round counts and store them as 32 bit integers")
                .action(ArgAction::SetTrue),
        )
        .arg(
            arg!(--"chunk-size" <rows> "Bin rows read per chunk")
                .value_parser(value_parser!(usize)),
        )
        .arg(arg!(-c --config <config> "Path to a TOML config file"))
}
