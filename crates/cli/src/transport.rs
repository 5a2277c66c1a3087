//! TCP transport to a management controller.
//!
//! Requests travel as one JSON object per line and every request is answered
//! by exactly one JSON line:
//!
//! ```text
//! -> {"address":[{"type":"subsystem","name":"logging"}],"operation":"read-resource","parameters":{}}
//! <- {"outcome":"success","result":{"level":"INFO"}}
//! <- {"outcome":"failed","failure-description":"..."}
//! ```
//!
//! A composite is sent as operation `composite` on the root with the step
//! requests under `parameters.steps`.

use std::io::{self, BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use mgmt_session::{Connection, Connector, Error, Interrupt, Request, Result, Value};
use serde::Deserialize;
use tracing::{debug, warn};

/// Connect timeout used when none is configured.
pub const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens JSON-lines connections over TCP.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    timeout: Duration,
}

impl Default for TcpConnector {
    fn default() -> Self {
        Self::new(CONNECTION_TIMEOUT)
    }
}

impl TcpConnector {
    /// A connector giving up on unanswered connects after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Connector for TcpConnector {
    fn connect(&self, host: &str, port: u16) -> Result<Box<dyn Connection>> {
        let address = resolve_tcp_address(host, port).map_err(|e| Error::UnknownHost {
            host: host.to_string(),
            reason: e.to_string(),
        })?;
        let stream =
            TcpStream::connect_timeout(&address, self.timeout).map_err(|e| Error::Unreachable {
                host: host.to_string(),
                port,
                reason: e.to_string(),
            })?;
        let reader = stream.try_clone().map_err(transport_error)?;
        debug!(%address, "tcp connection opened");
        Ok(Box::new(TcpConnection {
            reader: BufReader::new(reader),
            writer: stream,
        }))
    }
}

fn resolve_tcp_address(host: &str, port: u16) -> io::Result<SocketAddr> {
    let mut addrs = (host, port).to_socket_addrs()?;
    addrs
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::AddrNotAvailable, "no resolved addresses"))
}

fn transport_error(e: io::Error) -> Error {
    warn!(error = %e, "transport failure");
    Error::Transport {
        reason: e.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct Reply {
    outcome: String,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default, rename = "failure-description")]
    failure_description: Option<String>,
}

impl Reply {
    fn into_result(self) -> Result<Value> {
        match self.outcome.as_str() {
            "success" => Ok(self.result.unwrap_or(Value::Null)),
            _ => Err(Error::OperationFailed {
                description: self
                    .failure_description
                    .unwrap_or_else(|| format!("Operation outcome '{}'", self.outcome)),
            }),
        }
    }
}

struct TcpConnection {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl TcpConnection {
    fn round_trip(&mut self, body: &serde_json::Value) -> Result<Value> {
        let mut line = serde_json::to_string(body).map_err(|e| Error::Transport {
            reason: e.to_string(),
        })?;
        line.push('\n');
        self.writer
            .write_all(line.as_bytes())
            .and_then(|_| self.writer.flush())
            .map_err(transport_error)?;

        let mut reply = String::new();
        let read = self.reader.read_line(&mut reply).map_err(transport_error)?;
        if read == 0 {
            return Err(transport_error(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed by the controller",
            )));
        }
        let reply: Reply = serde_json::from_str(reply.trim_end()).map_err(|e| Error::Transport {
            reason: format!("malformed reply: {}", e),
        })?;
        reply.into_result()
    }
}

impl Connection for TcpConnection {
    fn execute(&mut self, request: &Request) -> Result<Value> {
        let body = serde_json::to_value(request).map_err(|e| Error::Transport {
            reason: e.to_string(),
        })?;
        self.round_trip(&body)
    }

    fn execute_composite(&mut self, requests: &[Request]) -> Result<Value> {
        let body = serde_json::json!({
            "address": [],
            "operation": "composite",
            "parameters": { "steps": requests },
        });
        self.round_trip(&body)
    }

    fn close(&mut self) {
        shutdown(&self.writer);
    }

    fn interrupter(&self) -> Option<Interrupt> {
        match self.writer.try_clone() {
            Ok(stream) => Some(Box::new(move || shutdown(&stream))),
            Err(e) => {
                debug!(error = %e, "no interrupt handle for tcp connection");
                None
            }
        }
    }
}

fn shutdown(stream: &TcpStream) {
    if let Err(e) = stream.shutdown(std::net::Shutdown::Both) {
        debug!(error = %e, "tcp shutdown failed");
    }
}
