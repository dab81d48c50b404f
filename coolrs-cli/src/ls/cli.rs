use clap::{Arg, Command};

pub const LS_CMD: &str = "ls";

pub fn create_ls_cli() -> Command {
    Command::new(LS_CMD)
        .about("List the matrix nodes stored under a path.")
        .arg_required_else_help(true)
        .arg(Arg::new("path").required(true).help("Path of the store"))
}
