//! Error types for line dispatch.
//!
//! Every failure a dispatched line can produce is represented by the [`Error`]
//! enum. The session catches all of them at the dispatch boundary and renders
//! them as a single diagnostic line, so the `Display` text of each variant is
//! what the user sees.

use mgmt_core::ParseError;

/// Session and dispatch errors.
///
/// # Categories
///
/// | Category | Variants | Description |
/// |----------|----------|-------------|
/// | Parse | `Parse` | Malformed operation or address expression |
/// | Dispatch | `UnknownCommand`, `NotAllowedInBatch`, `InvalidArguments`, `DuplicateCommand` | Command lookup and arguments |
/// | Batch | `BatchAlreadyActive`, `NoActiveBatch`, `HeldBatchExists`, `NoHeldBatch`, `EmptyBatch`, `LineOutOfRange`, `BatchFailed` | Batch state machine |
/// | Connection | `NotConnected`, `UnknownHost`, `Unreachable`, `ControllerUnavailable`, `OperationFailed`, `Transport` | Endpoint interaction |
/// | Handler | `Handler` | Failure reported by a command handler |
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    // ==================== Parse Errors ====================
    /// Malformed expression
    #[error(transparent)]
    Parse(#[from] ParseError),

    // ==================== Dispatch Errors ====================
    /// No handler is registered under the command name
    #[error("Unexpected command '{line}'. Type 'help' for the list of supported commands.")]
    UnknownCommand { line: String },

    /// The command cannot be captured into the active batch
    #[error("The command is not allowed in a batch.")]
    NotAllowedInBatch,

    /// Bad or missing command arguments
    #[error("{reason}")]
    InvalidArguments { reason: String },

    /// Two registrations share an alias
    #[error("duplicate command name: {name}")]
    DuplicateCommand { name: String },

    // ==================== Batch Errors ====================
    /// `begin` while a batch is already active
    #[error("Can't start a new batch while in batch mode.")]
    BatchAlreadyActive,

    /// A batch operation without an active batch
    #[error("No active batch.")]
    NoActiveBatch,

    /// A held batch with this name already exists
    #[error("{}", held_exists(.name))]
    HeldBatchExists { name: Option<String> },

    /// No held batch with this name
    #[error("{}", held_missing(.name))]
    NoHeldBatch { name: Option<String> },

    /// `run-batch` on an empty batch
    #[error("The batch is empty.")]
    EmptyBatch,

    /// A 1-based line number outside the batch
    #[error("Line number {line} is out of range: the batch has {len} line(s).")]
    LineOutOfRange { line: usize, len: usize },

    /// The composite submission of a batch failed
    #[error("Failed to execute batch: {reason}")]
    BatchFailed { reason: String },

    // ==================== Connection Errors ====================
    /// An endpoint call without a connection
    #[error("You are disconnected at the moment. Type 'connect' to connect to the server or 'help' for the list of supported commands.")]
    NotConnected,

    /// Host name resolution failed
    #[error("Failed to resolve host '{host}': {reason}")]
    UnknownHost { host: String, reason: String },

    /// The endpoint could not be reached
    #[error("Failed to connect to the controller at {host}:{port}: {reason}")]
    Unreachable {
        host: String,
        port: u16,
        reason: String,
    },

    /// Connected, but the controller reported no resources
    #[error("The controller is not available at {host}:{port}")]
    ControllerUnavailable { host: String, port: u16 },

    /// The endpoint rejected an operation
    #[error("{description}")]
    OperationFailed { description: String },

    /// Wire-level failure talking to the endpoint
    #[error("Communication error: {reason}")]
    Transport { reason: String },

    // ==================== Handler Errors ====================
    /// Failure reported by a command handler
    #[error("{reason}")]
    Handler { reason: String },
}

impl Error {
    /// Shorthand for [`Error::InvalidArguments`].
    pub fn invalid_arguments(reason: impl Into<String>) -> Self {
        Error::InvalidArguments {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`Error::Handler`].
    pub fn handler(reason: impl Into<String>) -> Self {
        Error::Handler {
            reason: reason.into(),
        }
    }

    /// Whether this error came from the endpoint connection.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Error::NotConnected
                | Error::UnknownHost { .. }
                | Error::Unreachable { .. }
                | Error::ControllerUnavailable { .. }
                | Error::Transport { .. }
        )
    }
}

fn held_exists(name: &Option<String>) -> String {
    match name {
        Some(name) => format!("Batch with name '{}' already held back.", name),
        None => "There is already an unnamed held back batch.".to_string(),
    }
}

fn held_missing(name: &Option<String>) -> String {
    match name {
        Some(name) => format!("No held back batch named '{}'.", name),
        None => "There is no unnamed held back batch.".to_string(),
    }
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, Error>;
