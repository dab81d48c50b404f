use clap::{Arg, ArgAction, Command, arg};

pub const INFO_CMD: &str = "info";

pub fn create_info_cli() -> Command {
    Command::new(INFO_CMD)
        .about("Print the metadata and bin columns of a matrix node.")
        .arg_required_else_help(true)
        .arg(Arg::new("uri").required(true).help("Matrix uri, `path` or `path::/node`"))
        .arg(
            arg!(--"missing-bins" "Also derive the missing bins both ways and report disagreements")
                .action(ArgAction::SetTrue),
        )
}
