//! Core types for the management console
//!
//! This crate defines the foundational types shared by the session engine and
//! the command line front end:
//! - Value: structured parameter and result values
//! - AddressStep / Address: absolute node paths in the managed resource tree
//! - AddressContext: the navigable "working directory" of a session
//! - Request: one resolved management operation
//! - OperationRequestParser: operation expression grammar and address resolver
//! - ParseError: the error produced for malformed expressions
//!
//! Nothing in this crate performs I/O.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod address;
pub mod error;
pub mod parser;
pub mod request;
pub mod value;

pub use address::{Address, AddressContext, AddressStep};
pub use error::{ParseError, ParseResult};
pub use parser::{find_operation_separator, OperationRequestParser, ParsedExpression, ParsedOperation};
pub use request::Request;
pub use value::Value;
