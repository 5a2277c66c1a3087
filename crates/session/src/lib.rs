//! # Management console session engine
//!
//! The dispatch core of the management console: every line a user types or a
//! script supplies goes through a [`Session`], which decides whether it is
//! navigation, a management operation, or a named command, and then either
//! executes it against the connected controller or captures it into the
//! active batch.
//!
//! ## Quick Start
//!
//! ```text
//! use std::sync::Arc;
//! use mgmt_session::{CommandRegistry, InMemoryController, Session};
//!
//! let registry = Arc::new(CommandRegistry::builtin()?);
//! let mut session = Session::new(registry, Box::new(InMemoryController::standalone()));
//!
//! session.process_line("connect");
//! session.process_line("batch");
//! session.process_line("/subsystem=datasources:add(name=foo)");
//! session.process_line("run-batch");
//! ```
//!
//! ## Line kinds
//!
//! | First character | Kind |
//! |-----------------|------|
//! | `.` or `/` without `:` | navigation |
//! | `:`, or `.`/`/` with `:` | operation |
//! | anything else | named command |

#![warn(missing_docs)]

mod batch;
mod classify;
mod console;
mod endpoint;
mod error;
mod extensions;
mod format;
mod handler;
mod history;
mod memory;
mod registry;
mod session;

// Handler modules
pub mod handlers;

// Test modules
#[cfg(test)]
mod tests;

// =============================================================================
// Public API
// =============================================================================

pub use batch::{Batch, BatchManager, BatchedCommand};
pub use classify::{classify, ClassifiedLine};
pub use console::{columns, CapturedOutput, Console, TERMINAL_WIDTH};
pub use endpoint::{
    parse_port, Connection, ConnectionInfo, Connector, ControllerAddress, ControllerMode,
    Interrupt, DEFAULT_HOST, DEFAULT_PORT,
};
pub use error::{Error, Result};
pub use extensions::Extensions;
pub use format::{format_error, format_value, OutputMode};
pub use handler::{DispatchContext, Handler, OperationCommand, ParsedArguments};
pub use history::{CommandHistory, HistoryFile, MAX_HISTORY};
pub use memory::{InMemoryController, ResourceNode};
pub use registry::{CommandRegistry, Registration, RegistryBuilder};
pub use session::{Session, ShutdownHandle, DISCONNECTED_HINT};

// Re-export the core model so front ends need a single import.
pub use mgmt_core::{
    Address, AddressContext, AddressStep, OperationRequestParser, ParseError, Request, Value,
};
