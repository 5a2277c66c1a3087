//! mgmt - scriptable command console for remote management endpoints
//!
//! A line-oriented console that navigates a hierarchical resource tree,
//! executes management operations against a controller, and composes
//! operations into batches submitted as one atomic composite.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use mgmt::{CommandRegistry, InMemoryController, Session};
//!
//! let registry = Arc::new(CommandRegistry::builtin()?);
//! let mut session = Session::new(registry, Box::new(InMemoryController::standalone()));
//!
//! session.process_line("connect");
//! session.process_line("cd /subsystem=logging");
//! session.process_line("ls");
//! ```
//!
//! # Architecture
//!
//! The parser and address model live in `mgmt-core`, the dispatch engine in
//! `mgmt-session`, and the `mgmtsh` binary in `mgmt-cli`. The session API
//! (which re-exports the core types) is re-exported here.

// Re-export the public API from mgmt-session
pub use mgmt_session::*;
