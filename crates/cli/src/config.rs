//! Console configuration via `~/.mgmtsh.toml`
//!
//! Every field is optional; a missing file means all defaults. Invocation
//! tokens such as `controller=` override what the file says.

use std::path::{Path, PathBuf};
use std::time::Duration;

use mgmt_session::{ControllerAddress, OutputMode, DEFAULT_HOST, DEFAULT_PORT};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Config file name looked up in the home directory.
pub const CONFIG_FILE_NAME: &str = ".mgmtsh.toml";

/// History file name used when the config does not name one.
pub const HISTORY_FILE_NAME: &str = ".mgmtsh_history";

/// Configuration errors. Always fatal at start-up.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid output mode '{0}'. Expected \"human\", \"json\" or \"raw\".")]
    OutputMode(String),
}

/// The `[controller]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ControllerConfig {
    /// Default controller host
    #[serde(default = "default_host")]
    pub host: String,
    /// Default controller port
    #[serde(default = "default_port")]
    pub port: u16,
    /// TCP connect timeout in milliseconds (default: 5000)
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_connect_timeout_ms() -> u64 {
    5000
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl ControllerConfig {
    /// The configured default controller.
    pub fn address(&self) -> ControllerAddress {
        ControllerAddress::new(self.host.clone(), self.port)
    }

    /// The configured connect timeout.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// Console configuration.
///
/// # Example
///
/// ```toml
/// output = "human"
/// log = "warn"
/// history = true
///
/// [controller]
/// host = "localhost"
/// port = 9999
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsoleConfig {
    /// Persist interactive history between runs
    #[serde(default = "default_history")]
    pub history: bool,
    /// History file; `~/.mgmtsh_history` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_file: Option<PathBuf>,
    /// Output mode: `"human"`, `"json"` or `"raw"`
    #[serde(default = "default_output")]
    pub output: String,
    /// `tracing` filter used when `MGMTSH_LOG` is not set
    #[serde(default = "default_log")]
    pub log: String,
    /// Default controller
    #[serde(default)]
    pub controller: ControllerConfig,
}

fn default_history() -> bool {
    true
}

fn default_output() -> String {
    "human".to_string()
}

fn default_log() -> String {
    "warn".to_string()
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            history: default_history(),
            history_file: None,
            output: default_output(),
            log: default_log(),
            controller: ControllerConfig::default(),
        }
    }
}

impl ConsoleConfig {
    /// Load `path` when given, otherwise `~/.mgmtsh.toml` when it exists,
    /// otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => match home_dir().map(|home| home.join(CONFIG_FILE_NAME)) {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Read and parse config from a file path.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ConsoleConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        // Validate the output mode eagerly
        config.output_mode()?;
        Ok(config)
    }

    /// Parse the output string into an [`OutputMode`].
    pub fn output_mode(&self) -> Result<OutputMode, ConfigError> {
        OutputMode::from_name(&self.output).ok_or_else(|| ConfigError::OutputMode(self.output.clone()))
    }

    /// Where interactive history is persisted, if anywhere.
    pub fn history_path(&self) -> Option<PathBuf> {
        if !self.history {
            return None;
        }
        self.history_file
            .clone()
            .or_else(|| home_dir().map(|home| home.join(HISTORY_FILE_NAME)))
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}
