//! Command handler capabilities.
//!
//! A handler is registered under one or more names. Every handler can be
//! executed directly; handlers that can describe their effect as a single
//! management request additionally expose an [`OperationCommand`], which is
//! what lets them be captured into a batch.

use std::collections::{BTreeMap, BTreeSet};

use mgmt_core::Request;

use crate::error::{Error, Result};
use crate::session::Session;

/// The line being dispatched, passed to every handler invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchContext<'a> {
    /// The full trimmed input line
    pub line: &'a str,
    /// The command name as typed
    pub command: &'a str,
    /// Trimmed argument string, if any
    pub arguments: Option<&'a str>,
}

impl<'a> DispatchContext<'a> {
    /// Create a context.
    pub fn new(line: &'a str, command: &'a str, arguments: Option<&'a str>) -> Self {
        Self {
            line,
            command,
            arguments,
        }
    }

    /// Raw argument string, empty when there are no arguments.
    pub fn raw_arguments(&self) -> &'a str {
        self.arguments.unwrap_or("")
    }

    /// Tokenise the arguments.
    pub fn parsed_arguments(&self) -> Result<ParsedArguments> {
        ParsedArguments::parse(self.raw_arguments())
    }
}

/// Command arguments split into switches, `--name=value` options and positionals.
///
/// Tokenising follows shell quoting rules, so `"a b"` is one positional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArguments {
    switches: BTreeSet<String>,
    options: BTreeMap<String, String>,
    positionals: Vec<String>,
}

impl ParsedArguments {
    /// Tokenise an argument string.
    pub fn parse(arguments: &str) -> Result<Self> {
        let tokens = shlex::split(arguments)
            .ok_or_else(|| Error::invalid_arguments(format!("Invalid quoting: {}", arguments)))?;

        let mut parsed = ParsedArguments::default();
        for token in tokens {
            if let Some(long) = token.strip_prefix("--") {
                match long.split_once('=') {
                    Some((name, value)) => {
                        if parsed.options.insert(name.to_string(), value.to_string()).is_some() {
                            return Err(Error::invalid_arguments(format!(
                                "Duplicate argument '{}'.",
                                name
                            )));
                        }
                    }
                    None => {
                        parsed.switches.insert(long.to_string());
                    }
                }
            } else if token.len() > 1 && token.starts_with('-') && token.parse::<i64>().is_err() {
                parsed.switches.insert(token[1..].to_string());
            } else {
                parsed.positionals.push(token);
            }
        }
        Ok(parsed)
    }

    /// Whether `--name` (or `-name`) was given.
    pub fn has_switch(&self, name: &str) -> bool {
        self.switches.contains(name)
    }

    /// Value of `--name=value`.
    pub fn option(&self, name: &str) -> Option<&str> {
        self.options.get(name).map(String::as_str)
    }

    /// Positional arguments in order.
    pub fn positionals(&self) -> &[String] {
        &self.positionals
    }

    /// Positional argument at `index`.
    pub fn positional(&self, index: usize) -> Option<&str> {
        self.positionals.get(index).map(String::as_str)
    }

    /// Whether nothing at all was given.
    pub fn is_empty(&self) -> bool {
        self.switches.is_empty() && self.options.is_empty() && self.positionals.is_empty()
    }

    /// Reject switches and options outside `allowed`.
    pub fn check_allowed(&self, allowed: &[&str]) -> Result<()> {
        let unknown = self
            .switches
            .iter()
            .chain(self.options.keys())
            .find(|name| !allowed.contains(&name.as_str()));
        match unknown {
            Some(name) => Err(Error::invalid_arguments(format!(
                "Unrecognized argument '{}'.",
                name
            ))),
            None => Ok(()),
        }
    }

    /// Reject more than `max` positionals.
    pub fn check_max_positionals(&self, max: usize) -> Result<()> {
        if self.positionals.len() > max {
            return Err(Error::invalid_arguments(format!(
                "Unexpected argument '{}'.",
                self.positionals[max]
            )));
        }
        Ok(())
    }
}

/// An executable console command.
pub trait Handler: Send + Sync {
    /// One-line description shown by `help`.
    fn summary(&self) -> &str;

    /// Run the command against the session.
    fn handle(&self, session: &mut Session, ctx: &DispatchContext<'_>) -> Result<()>;

    /// Whether the command takes part in batches.
    ///
    /// Session-control commands return `false` and always run immediately,
    /// even while a batch is being composed.
    fn batch_mode(&self) -> bool {
        true
    }

    /// The request-building capability, for commands that have one.
    fn operation(&self) -> Option<&dyn OperationCommand> {
        None
    }
}

/// A command whose effect is a single management request.
pub trait OperationCommand {
    /// Build the request from the session state and the dispatched line.
    ///
    /// Reads the session but never changes it.
    fn build_request(&self, session: &Session, ctx: &DispatchContext<'_>) -> Result<Request>;
}
