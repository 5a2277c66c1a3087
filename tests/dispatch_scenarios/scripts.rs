//! Scripted input scenarios.

use std::fs;
use std::io::Write;

use mgmt::InMemoryController;
use tempfile::NamedTempFile;

use crate::session_with_default;

#[test]
fn test_script_file_counts_failures_and_stops_at_quit() {
    let mut script = NamedTempFile::new().unwrap();
    writeln!(script, "connect").unwrap();
    writeln!(script).unwrap();
    writeln!(script, "cd ../..").unwrap();
    writeln!(script, "frobnicate").unwrap();
    writeln!(script, "pwd").unwrap();
    writeln!(script, "quit").unwrap();
    writeln!(script, "pwd").unwrap();

    let text = fs::read_to_string(script.path()).unwrap();
    let controller = InMemoryController::standalone();
    let (mut session, output) = session_with_default(&controller);

    let failed = session.run_script(text.lines());

    assert_eq!(failed, 2);
    let lines = output.lines();
    assert_eq!(
        lines.first().map(String::as_str),
        Some("Connected to standalone controller at myhost:1234")
    );
    assert_eq!(lines.last().map(String::as_str), Some("/"));
    assert_eq!(lines.iter().filter(|l| l.as_str() == "/").count(), 1);
}

#[test]
fn test_history_reflects_script() {
    let controller = InMemoryController::standalone();
    let (mut session, _output) = session_with_default(&controller);
    session.run_script(["pwd", "cd subsystem=logging", "", "pwd"]);
    assert_eq!(
        session.history().entries(),
        &["pwd", "cd subsystem=logging", "pwd"]
    );
}
