//! In-session command history.

use std::path::PathBuf;

/// Upper bound on remembered lines; the oldest are dropped first.
pub const MAX_HISTORY: usize = 500;

/// Lines entered during the session, oldest first.
#[derive(Debug, Clone)]
pub struct CommandHistory {
    entries: Vec<String>,
    enabled: bool,
    cleared: bool,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            enabled: true,
            cleared: false,
        }
    }
}

impl CommandHistory {
    /// Empty, enabled history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember a line when history is enabled. Consecutive duplicates are
    /// collapsed.
    pub fn record(&mut self, line: &str) {
        if !self.enabled || line.is_empty() {
            return;
        }
        if self.entries.last().map(String::as_str) == Some(line) {
            return;
        }
        self.entries.push(line.to_string());
        if self.entries.len() > MAX_HISTORY {
            let excess = self.entries.len() - MAX_HISTORY;
            self.entries.drain(..excess);
        }
    }

    /// Remembered lines, oldest first.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cleared = true;
    }

    /// Whether [`clear`](Self::clear) was called since the last check. Front
    /// ends keeping their own copy of the history use it to follow suit.
    pub fn take_cleared(&mut self) -> bool {
        std::mem::take(&mut self.cleared)
    }

    /// Whether new lines are recorded.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Turn recording on or off.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Number of remembered lines.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is remembered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Where the front end persists history between runs. Stored as a session
/// extension by front ends that have one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryFile(pub PathBuf);
