//! Error types for expression parsing
//!
//! Parsing is the only fallible operation in this crate. Every failure keeps
//! the offending line and the character offset where parsing stopped so the
//! console can point the user at the problem.

use thiserror::Error;

/// Result type alias for parser operations
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// A malformed operation, address or parameter expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to parse '{line}': {reason} at index {offset}")]
pub struct ParseError {
    /// The full text that was being parsed
    pub line: String,
    /// Character offset at which the problem was detected
    pub offset: usize,
    /// Human readable description of the problem
    pub reason: String,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(line: impl Into<String>, offset: usize, reason: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            offset,
            reason: reason.into(),
        }
    }
}
