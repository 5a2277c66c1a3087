//! Termination hook.
//!
//! A background thread waits for termination signals and closes the
//! controller connection before the process exits. SIGINT is only watched in
//! non-interactive runs: at the prompt, Ctrl-C belongs to the line editor.

use std::io;
use std::thread;

use mgmt_session::ShutdownHandle;
use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;
use thiserror::Error;
use tracing::info;

/// Exit status used after a termination signal.
const SIGNAL_EXIT_CODE: i32 = 130;

/// Errors installing the termination hook.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Installing signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Signals that end the process.
fn watched_signals(interactive: bool) -> Vec<i32> {
    let mut signals = vec![SIGTERM, SIGHUP, SIGQUIT];
    if !interactive {
        signals.push(SIGINT);
    }
    signals
}

/// Spawn the hook thread. `quiet` suppresses the disconnect notice.
pub fn install(handle: ShutdownHandle, interactive: bool, quiet: bool) -> Result<(), ShutdownError> {
    let mut signals = Signals::new(watched_signals(interactive))
        .map_err(|source| ShutdownError::Install { source })?;

    thread::Builder::new()
        .name("mgmtsh-shutdown".to_string())
        .spawn(move || {
            if let Some(signal) = signals.forever().next() {
                info!(signal, "termination signal received");
                if let Some(info) = handle.disconnect() {
                    if !quiet {
                        eprintln!("Closed connection to {}:{}", info.host, info.port);
                    }
                }
                std::process::exit(SIGNAL_EXIT_CODE);
            }
        })
        .map_err(|source| ShutdownError::Install { source })?;
    Ok(())
}
