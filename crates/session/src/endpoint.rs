//! Management endpoint collaborators.
//!
//! The session never talks to the network itself. It asks a [`Connector`] for
//! a [`Connection`] and sends every request through that. The CLI plugs in a
//! TCP transport; tests use [`crate::memory::InMemoryController`].

use std::fmt;

use mgmt_core::{Request, Value};

use crate::error::{Error, Result};

/// Default controller host.
pub const DEFAULT_HOST: &str = "localhost";

/// Default controller port.
pub const DEFAULT_PORT: u16 = 9999;

/// Opens connections to a management endpoint.
pub trait Connector: Send {
    /// Connect to `host:port`.
    ///
    /// Fails with [`Error::UnknownHost`] when the host does not resolve and
    /// [`Error::Unreachable`] when nothing answers.
    fn connect(&self, host: &str, port: u16) -> Result<Box<dyn Connection>>;
}

/// Severs a connection from another thread, failing any call in flight.
pub type Interrupt = Box<dyn Fn() + Send + Sync>;

/// An open connection to a management endpoint.
pub trait Connection: Send {
    /// Execute one request and return its result.
    ///
    /// An operation rejected by the endpoint fails with [`Error::OperationFailed`].
    fn execute(&mut self, request: &Request) -> Result<Value>;

    /// Execute the requests as one all-or-nothing composite operation.
    fn execute_composite(&mut self, requests: &[Request]) -> Result<Value>;

    /// Release the connection. Further calls are not expected.
    fn close(&mut self);

    /// Callback that unblocks a call in flight when the connection is closed
    /// from another thread. Without one, the connection is closed once the
    /// call returns.
    fn interrupter(&self) -> Option<Interrupt> {
        None
    }
}

/// Kind of controller on the other end of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerMode {
    /// A single standalone server
    Standalone,
    /// A domain controller managing server groups
    Domain,
}

impl ControllerMode {
    /// Decide the mode from the root node's child types.
    pub fn from_root_types(types: &[String]) -> Self {
        if types.iter().any(|t| t == "server-group") {
            ControllerMode::Domain
        } else {
            ControllerMode::Standalone
        }
    }
}

impl fmt::Display for ControllerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerMode::Standalone => f.write_str("standalone"),
            ControllerMode::Domain => f.write_str("domain"),
        }
    }
}

/// Descriptor of the live connection. Present exactly while connected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    /// Controller host as given by the user
    pub host: String,
    /// Controller port
    pub port: u16,
    /// Detected controller mode
    pub mode: ControllerMode,
}

/// `host:port` pair naming a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerAddress {
    /// Host name or IP address
    pub host: String,
    /// Management port
    pub port: u16,
}

impl Default for ControllerAddress {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ControllerAddress {
    /// Create an address.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Split `host[:port]`, `:port` or `[v6-address][:port]` into its optional parts.
    pub fn parse_partial(text: &str) -> Result<(Option<String>, Option<u16>)> {
        let text = text.trim();
        if text.is_empty() {
            return Ok((None, None));
        }

        let (host, port) = if let Some(rest) = text.strip_prefix('[') {
            match rest.split_once(']') {
                Some((host, tail)) => match tail.strip_prefix(':') {
                    Some(port) => (host, Some(port)),
                    None if tail.is_empty() => (host, None),
                    None => {
                        return Err(Error::invalid_arguments(format!(
                            "Invalid controller address '{}'",
                            text
                        )))
                    }
                },
                None => {
                    return Err(Error::invalid_arguments(format!(
                        "Invalid controller address '{}'",
                        text
                    )))
                }
            }
        } else {
            match text.rsplit_once(':') {
                Some((host, port)) => (host, Some(port)),
                None => (text, None),
            }
        };

        let port = port.map(parse_port).transpose()?;
        let host = if host.is_empty() {
            None
        } else {
            Some(host.to_string())
        };
        Ok((host, port))
    }

    /// Fill the missing parts of a partial address from this one.
    pub fn merge(&self, host: Option<String>, port: Option<u16>) -> ControllerAddress {
        ControllerAddress {
            host: host.unwrap_or_else(|| self.host.clone()),
            port: port.unwrap_or(self.port),
        }
    }
}

impl fmt::Display for ControllerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Parse a port number.
pub fn parse_port(text: &str) -> Result<u16> {
    text.trim().parse::<u16>().map_err(|_| {
        Error::invalid_arguments(format!(
            "The port must be a valid non-negative integer: '{}'",
            text
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_forms() {
        assert_eq!(ControllerAddress::parse_partial("").unwrap(), (None, None));
        assert_eq!(
            ControllerAddress::parse_partial("myhost").unwrap(),
            (Some("myhost".into()), None)
        );
        assert_eq!(
            ControllerAddress::parse_partial("myhost:1234").unwrap(),
            (Some("myhost".into()), Some(1234))
        );
        assert_eq!(
            ControllerAddress::parse_partial(":1234").unwrap(),
            (None, Some(1234))
        );
        assert_eq!(
            ControllerAddress::parse_partial("[::1]:9990").unwrap(),
            (Some("::1".into()), Some(9990))
        );
    }

    #[test]
    fn test_bad_port_message() {
        let err = ControllerAddress::parse_partial("myhost:abc").unwrap_err();
        assert_eq!(
            err.to_string(),
            "The port must be a valid non-negative integer: 'abc'"
        );
        assert!(ControllerAddress::parse_partial("myhost:-1").is_err());
    }

    #[test]
    fn test_merge_with_defaults() {
        let defaults = ControllerAddress::default();
        assert_eq!(defaults.to_string(), "localhost:9999");
        let merged = defaults.merge(None, Some(1234));
        assert_eq!(merged, ControllerAddress::new("localhost", 1234));
    }

    #[test]
    fn test_mode_from_root_types() {
        let standalone = vec!["subsystem".to_string(), "interface".to_string()];
        assert_eq!(
            ControllerMode::from_root_types(&standalone),
            ControllerMode::Standalone
        );
        let domain = vec!["server-group".to_string(), "host".to_string()];
        assert_eq!(ControllerMode::from_root_types(&domain), ControllerMode::Domain);
    }
}
