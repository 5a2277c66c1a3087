//! Session set-up and the three run modes.
//!
//! - **Script mode**: `file=` or `commands=`/`command=`, lines dispatched in
//!   order, then the session ends
//! - **Interactive mode**: no input source and a terminal on stdin
//! - **Pipe mode**: no input source, lines read from piped stdin

use std::fs::File;
use std::io::{BufReader, IsTerminal};
use std::path::Path;
use std::sync::Arc;

use mgmt_session::{
    format_error, CommandRegistry, Connector, Console, HistoryFile, OutputMode, Session,
    DISCONNECTED_HINT,
};
use tracing::{info, warn};

use crate::config::ConsoleConfig;
use crate::invocation::{InputSource, Invocation};
use crate::repl;
use crate::shutdown;
use crate::transport::TcpConnector;

/// Build a session for this invocation.
pub fn build_session(
    config: &ConsoleConfig,
    invocation: &Invocation,
    connector: Box<dyn Connector>,
    console: Console,
) -> Result<Session, mgmt_session::Error> {
    let registry = Arc::new(CommandRegistry::builtin()?);
    let controller = config
        .controller
        .address()
        .merge(invocation.host.clone(), invocation.port);
    Ok(Session::new(registry, connector)
        .with_console(console)
        .with_default_controller(controller))
}

/// Connect on start-up when `--connect` was given. A failure is reported
/// and the run continues disconnected.
fn connect_on_start(session: &mut Session, invocation: &Invocation) {
    if invocation.connect {
        if let Err(e) = session.connect(None, None) {
            let text = format_error(&e, session.output_mode());
            session.print_line(&text);
        }
    }
}

/// Dispatch a script and end the session. Returns the process exit code.
pub fn run_script<I, S>(session: &mut Session, invocation: &Invocation, lines: I) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    connect_on_start(session, invocation);
    let failed = session.run_script(lines);
    finish_script(session, invocation, failed)
}

/// Close the connection at the end of a script. Returns the process exit
/// code.
fn finish_script(session: &mut Session, invocation: &Invocation, failed: usize) -> i32 {
    if invocation.connect {
        session.disconnect_quietly();
    } else {
        session.disconnect();
    }
    info!(failed, "script finished");
    if failed == 0 {
        0
    } else {
        1
    }
}

fn run_file(session: &mut Session, invocation: &Invocation, path: &Path) -> i32 {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to open script");
            session.print_line(&format!("Failed to process file '{}'", path.display()));
            return 1;
        }
    };
    connect_on_start(session, invocation);
    let (mut failed, read_error) = repl::dispatch_lines(session, BufReader::new(file));
    if let Some(e) = read_error {
        warn!(path = %path.display(), error = %e, "failed to read script");
        session.print_line(&format!("Failed to process file '{}'", path.display()));
        failed += 1;
    }
    finish_script(session, invocation, failed)
}

/// Run the console. Returns the process exit code.
pub fn run(config: &ConsoleConfig, invocation: &Invocation, mode: OutputMode) -> i32 {
    let interactive = invocation.input.is_none() && std::io::stdin().is_terminal();
    let console = Console::stdout()
        .with_mode(mode)
        .with_interactive(interactive);
    let connector = Box::new(TcpConnector::new(config.controller.connect_timeout()));
    let mut session = match build_session(config, invocation, connector, console) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("{}", e);
            return 1;
        }
    };

    let quiet = invocation.connect && !interactive;
    if let Err(e) = shutdown::install(session.shutdown_handle(), interactive, quiet) {
        warn!(error = %e, "termination hook not installed");
    }

    match &invocation.input {
        Some(InputSource::File(path)) => run_file(&mut session, invocation, path),
        Some(InputSource::Commands(commands)) => run_script(&mut session, invocation, commands),
        None if interactive => {
            let history_path = config.history_path();
            if let Some(path) = &history_path {
                session.extensions_mut().insert(HistoryFile(path.clone()));
            }
            if invocation.connect {
                connect_on_start(&mut session, invocation);
            } else {
                session.print_line(DISCONNECTED_HINT);
            }
            let code = match repl::run_repl(&mut session, history_path.as_deref()) {
                Ok(()) => 0,
                Err(e) => {
                    eprintln!("Failed to start the line editor: {}", e);
                    1
                }
            };
            session.disconnect();
            code
        }
        None => {
            connect_on_start(&mut session, invocation);
            let code = repl::run_pipe(&mut session, std::io::stdin().lock());
            session.disconnect_quietly();
            code
        }
    }
}
