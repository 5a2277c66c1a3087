//! Console output sink.

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::warn;

use crate::format::OutputMode;

/// Column width used to lay out `ls` style listings.
pub const TERMINAL_WIDTH: usize = 80;

/// Where the session writes user-facing output.
pub struct Console {
    out: Box<dyn Write + Send>,
    mode: OutputMode,
    interactive: bool,
}

impl Console {
    /// Console writing to standard output.
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    /// Console writing to an arbitrary sink.
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out,
            mode: OutputMode::Human,
            interactive: false,
        }
    }

    /// Console writing into a [`CapturedOutput`] buffer.
    pub fn captured(buffer: &CapturedOutput) -> Self {
        Self::new(Box::new(buffer.clone()))
    }

    /// Set the output mode.
    pub fn with_mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    /// Mark the console as attached to a terminal.
    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Current output mode.
    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Whether a user is typing at a terminal.
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Write one line. Write failures are logged, never raised.
    pub fn print_line(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{}", text).and_then(|_| self.out.flush()) {
            warn!(error = %e, "failed to write console output");
        }
    }

    /// Print a list of names: a grid when interactive, one per line otherwise.
    pub fn print_columns(&mut self, items: &[String]) {
        if items.is_empty() {
            return;
        }
        if !self.interactive {
            for item in items {
                self.print_line(item);
            }
            return;
        }
        for row in columns(items, TERMINAL_WIDTH) {
            self.print_line(&row);
        }
    }
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console")
            .field("mode", &self.mode)
            .field("interactive", &self.interactive)
            .finish()
    }
}

/// Lay `items` out in rows of equal-width columns that fit `width`.
pub fn columns(items: &[String], width: usize) -> Vec<String> {
    let cell = items.iter().map(|s| s.chars().count()).max().unwrap_or(0) + 2;
    let per_row = (width / cell).max(1);
    items
        .chunks(per_row)
        .map(|row| {
            let mut line = String::new();
            for (i, item) in row.iter().enumerate() {
                if i + 1 == row.len() {
                    line.push_str(item);
                } else {
                    line.push_str(&format!("{:<cell$}", item, cell = cell));
                }
            }
            line
        })
        .collect()
}

/// In-memory output buffer, shareable between a console and its reader.
#[derive(Debug, Clone, Default)]
pub struct CapturedOutput {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl CapturedOutput {
    /// An empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }

    /// Everything written so far, split into lines.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    /// Discard everything written so far.
    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

impl Write for CapturedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_line_into_capture() {
        let buffer = CapturedOutput::new();
        let mut console = Console::captured(&buffer);
        console.print_line("hello");
        console.print_line("world");
        assert_eq!(buffer.lines(), vec!["hello", "world"]);
        buffer.clear();
        assert!(buffer.contents().is_empty());
    }

    #[test]
    fn test_columns_non_interactive_one_per_line() {
        let buffer = CapturedOutput::new();
        let mut console = Console::captured(&buffer);
        console.print_columns(&["a".to_string(), "b".to_string()]);
        assert_eq!(buffer.lines(), vec!["a", "b"]);
    }

    #[test]
    fn test_columns_grid() {
        let items: Vec<String> = ["logging", "datasources", "web"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rows = columns(&items, 30);
        assert_eq!(rows, vec!["logging      datasources", "web"]);

        let rows = columns(&items, 80);
        assert_eq!(rows, vec!["logging      datasources  web"]);
    }
}
