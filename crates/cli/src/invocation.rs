//! Start-up argument interpretation.
//!
//! Besides the dashed flags handled by clap, the console accepts
//! `controller=host[:port]`, `file=<path>`, `commands=<c1,c2,..>` and
//! `command=<c>`. Any problem here is fatal: one diagnostic line and the
//! process exits before a session exists.

use std::path::{Path, PathBuf};

use mgmt_session::ControllerAddress;
use thiserror::Error;

use crate::config::ConfigError;

/// Fatal start-up errors.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Duplicate argument 'file'.")]
    DuplicateFile,

    #[error("Duplicate argument 'command'/'commands'.")]
    DuplicateCommands,

    #[error("Only one of 'file', 'commands' or 'command' can appear as the argument at a time.")]
    ConflictingInput,

    #[error("Argument 'file' is missing value.")]
    MissingFileValue,

    #[error("File {} doesn't exist.", .0.display())]
    MissingFile(PathBuf),

    #[error("The port must be a valid non-negative integer: '{0}'")]
    InvalidPort(String),

    #[error("Unrecognized argument '{0}'.")]
    Unrecognized(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Where the lines of a non-interactive run come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// One line per line of the file
    File(PathBuf),
    /// Lines given on the command line
    Commands(Vec<String>),
}

/// Interpreted invocation tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    /// Controller host from `controller=`
    pub host: Option<String>,
    /// Controller port from `controller=`
    pub port: Option<u16>,
    /// `--connect` was given
    pub connect: bool,
    /// Script input, absent for interactive and pipe runs
    pub input: Option<InputSource>,
}

impl Invocation {
    /// Interpret `name=value` tokens.
    pub fn parse(tokens: &[String], connect: bool) -> Result<Self, StartupError> {
        let mut invocation = Invocation {
            connect,
            ..Invocation::default()
        };

        for token in tokens {
            if let Some(value) = token.strip_prefix("controller=") {
                let (host, port) = ControllerAddress::parse_partial(value)
                    .map_err(|_| StartupError::InvalidPort(token.clone()))?;
                invocation.host = host.or(invocation.host);
                invocation.port = port.or(invocation.port);
            } else if let Some(value) = token.strip_prefix("file=") {
                match invocation.input {
                    Some(InputSource::File(_)) => return Err(StartupError::DuplicateFile),
                    Some(InputSource::Commands(_)) => return Err(StartupError::ConflictingInput),
                    None => {}
                }
                if value.is_empty() {
                    return Err(StartupError::MissingFileValue);
                }
                let path = PathBuf::from(value);
                if !path.exists() {
                    return Err(StartupError::MissingFile(absolute(&path)));
                }
                invocation.input = Some(InputSource::File(path));
            } else if let Some(value) = token.strip_prefix("commands=") {
                invocation.set_commands(split_commands(value))?;
            } else if let Some(value) = token.strip_prefix("command=") {
                invocation.set_commands(vec![value.to_string()])?;
            } else {
                return Err(StartupError::Unrecognized(token.clone()));
            }
        }
        Ok(invocation)
    }

    fn set_commands(&mut self, commands: Vec<String>) -> Result<(), StartupError> {
        match self.input {
            Some(InputSource::File(_)) => Err(StartupError::ConflictingInput),
            Some(InputSource::Commands(_)) => Err(StartupError::DuplicateCommands),
            None => {
                self.input = Some(InputSource::Commands(commands));
                Ok(())
            }
        }
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|dir| dir.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Split a `commands=` value on commas outside double quotes, brackets and
/// parentheses. Empty pieces are dropped.
pub fn split_commands(value: &str) -> Vec<String> {
    let mut commands = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quoted = false;
    let mut escaped = false;

    for c in value.chars() {
        if escaped {
            escaped = false;
            current.push(c);
            continue;
        }
        match c {
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            '(' | '[' | '{' if !quoted => depth += 1,
            ')' | ']' | '}' if !quoted => depth = depth.saturating_sub(1),
            ',' if !quoted && depth == 0 => {
                let command = current.trim();
                if !command.is_empty() {
                    commands.push(command.to_string());
                }
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    let command = current.trim();
    if !command.is_empty() {
        commands.push(command.to_string());
    }
    commands
}
