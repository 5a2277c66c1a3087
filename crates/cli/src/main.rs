//! mgmtsh: command console for remote management endpoints.
//!
//! Three modes:
//! - **Script mode**: `mgmtsh file=<path>` or `mgmtsh commands=ls,pwd`
//! - **REPL mode**: `mgmtsh [controller=host:port] [--connect]` with a terminal
//! - **Pipe mode**: `echo ls | mgmtsh --connect`, line by line from stdin

mod commands;
mod config;
mod invocation;
mod launch;
mod repl;
mod shutdown;
mod transport;

use std::path::PathBuf;
use std::process;

use mgmt_session::OutputMode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::{build_cli, invocation_tokens};
use config::ConsoleConfig;
use invocation::{Invocation, StartupError};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "MGMTSH_LOG";

fn main() {
    let matches = build_cli().get_matches();

    let (config, invocation) = match load_startup(&matches) {
        Ok(startup) => startup,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    init_logging(&config);

    // Determine output mode
    let output_mode = if matches.get_flag("json") {
        OutputMode::Json
    } else if matches.get_flag("raw") {
        OutputMode::Raw
    } else {
        config.output_mode().unwrap_or_default()
    };

    let exit_code = launch::run(&config, &invocation, output_mode);
    process::exit(exit_code);
}

fn load_startup(matches: &clap::ArgMatches) -> Result<(ConsoleConfig, Invocation), StartupError> {
    let config_path = matches.get_one::<String>("config").map(PathBuf::from);
    let config = ConsoleConfig::load(config_path.as_deref())?;
    let invocation = Invocation::parse(&invocation_tokens(matches), matches.get_flag("connect"))?;
    Ok((config, invocation))
}

fn init_logging(config: &ConsoleConfig) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&config.log))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
