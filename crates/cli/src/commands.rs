//! Clap command definition.
//!
//! The console keeps the classic `name=value` invocation tokens
//! (`controller=`, `file=`, `commands=`, `command=`), so clap only owns the
//! dashed flags and collects everything else verbatim for
//! [`crate::invocation::Invocation::parse`].

use clap::{Arg, ArgAction, Command};

/// Build the command line definition.
pub fn build_cli() -> Command {
    Command::new("mgmtsh")
        .about("Command console for remote management endpoints")
        .arg(
            Arg::new("connect")
                .long("connect")
                .help("Connect to the controller on start-up")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Configuration file (default: ~/.mgmtsh.toml)"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("JSON output mode")
                .action(ArgAction::SetTrue)
                .conflicts_with("raw"),
        )
        .arg(
            Arg::new("raw")
                .long("raw")
                .help("Raw output mode (no type prefixes, no quotes)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("tokens")
                .value_name("ARG")
                .help("controller=<host[:port]>, file=<path>, commands=<c1,c2,..> or command=<c>")
                .num_args(0..)
                .action(ArgAction::Append),
        )
}

/// The `name=value` tokens given on the command line, in order.
pub fn invocation_tokens(matches: &clap::ArgMatches) -> Vec<String> {
    matches
        .get_many::<String>("tokens")
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}
