//! Built-in handler tests.

use std::path::PathBuf;

use super::{create_connected_session, create_test_session};
use crate::{Error, HistoryFile};

// =============================================================================
// Navigation
// =============================================================================

#[test]
fn test_cd_and_pwd() {
    let (mut session, _controller, output) = create_test_session();
    session.dispatch("cd subsystem=logging").unwrap();
    session.dispatch("cd logger=root").unwrap();
    session.dispatch("pwd").unwrap();
    session.dispatch("cd ..").unwrap();
    session.dispatch("cn").unwrap();
    session.dispatch("cd /").unwrap();
    session.dispatch("pwn").unwrap();

    assert_eq!(
        output.lines(),
        vec![
            "/subsystem=logging/logger=root",
            "/subsystem=logging",
            "/"
        ]
    );
}

#[test]
fn test_cd_type_then_name() {
    let (mut session, _controller, _output) = create_test_session();
    session.dispatch("cd subsystem").unwrap();
    assert_eq!(session.address().format(), "subsystem");
    session.dispatch("cd logging").unwrap();
    assert_eq!(session.address().format(), "subsystem=logging");
    session.dispatch("cd .type").unwrap();
    assert_eq!(session.address().format(), "subsystem");
}

#[test]
fn test_ls_root_and_type() {
    let (mut session, _controller, output) = create_connected_session();
    session.dispatch("ls").unwrap();
    assert_eq!(output.lines(), vec!["interface", "subsystem"]);
    output.clear();

    session.dispatch("ls subsystem").unwrap();
    assert_eq!(output.lines(), vec!["datasources", "logging"]);
    output.clear();

    session.dispatch("cd subsystem=logging").unwrap();
    session.dispatch("ls").unwrap();
    assert_eq!(output.lines(), vec!["console-handler", "logger"]);
}

#[test]
fn test_ls_does_not_move() {
    let (mut session, _controller, _output) = create_connected_session();
    session.dispatch("ls /subsystem=logging").unwrap();
    assert!(session.address().is_empty());
}

#[test]
fn test_ls_disconnected() {
    let (mut session, _controller, _output) = create_test_session();
    let result = session.dispatch("ls");
    assert!(matches!(result, Err(Error::NotConnected)), "got {:?}", result);
}

// =============================================================================
// read-attribute
// =============================================================================

#[test]
fn test_read_attribute() {
    let (mut session, _controller, output) = create_connected_session();
    session.dispatch("cd subsystem=logging").unwrap();
    session.dispatch("read-attribute level").unwrap();
    session
        .dispatch("read-attribute inet-address --node=/interface=public")
        .unwrap();
    assert_eq!(output.lines(), vec!["\"INFO\"", "\"127.0.0.1\""]);
}

#[test]
fn test_read_attribute_argument_errors() {
    let (mut session, _controller, _output) = create_connected_session();
    let err = session.dispatch("read-attribute").unwrap_err();
    assert_eq!(err.to_string(), "Required argument 'name' is missing.");

    let err = session.dispatch("read-attribute level --bogus=1").unwrap_err();
    assert_eq!(err.to_string(), "Unrecognized argument 'bogus'.");

    let err = session
        .dispatch("read-attribute level --node=subsystem")
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Node name not specified for type 'subsystem'."
    );
}

// =============================================================================
// help / history / quit
// =============================================================================

#[test]
fn test_help_lists_every_command() {
    let (mut session, _controller, output) = create_test_session();
    session.dispatch("help").unwrap();
    let text = output.contents();
    assert!(text.starts_with("Supported commands:"));
    for name in session.registry().names() {
        assert!(text.contains(name), "help is missing {}", name);
    }
    assert!(text.contains("An operation request has the form:"));
}

#[test]
fn test_history_listing_and_flags() {
    let (mut session, _controller, output) = create_test_session();
    session.dispatch("pwd").unwrap();
    session.dispatch("cd subsystem=logging").unwrap();
    output.clear();

    session.dispatch("history").unwrap();
    assert_eq!(output.lines(), vec!["pwd", "cd subsystem=logging", "history"]);
    output.clear();

    session.dispatch("history --disable").unwrap();
    session.dispatch("pwd").unwrap();
    output.clear();
    session.dispatch("history").unwrap();
    assert_eq!(
        output.lines(),
        vec![
            "pwd",
            "cd subsystem=logging",
            "history",
            "history --disable",
            "(history is disabled)"
        ]
    );

    session.dispatch("history --enable").unwrap();
    session.dispatch("history --clear").unwrap();
    assert!(session.history().is_empty());
}

#[test]
fn test_history_rejects_two_flags() {
    let (mut session, _controller, _output) = create_test_session();
    let result = session.dispatch("history --clear --enable");
    assert!(
        matches!(result, Err(Error::InvalidArguments { .. })),
        "got {:?}",
        result
    );
}

#[test]
fn test_history_file() {
    let (mut session, _controller, output) = create_test_session();
    session.dispatch("history --file").unwrap();
    assert_eq!(output.lines(), vec!["History is not saved to a file."]);
    output.clear();

    session
        .extensions_mut()
        .insert(HistoryFile(PathBuf::from("/tmp/.mgmtsh_history")));
    session.dispatch("history --file").unwrap();
    assert_eq!(output.lines(), vec!["/tmp/.mgmtsh_history"]);
}

#[test]
fn test_quit_stops_script() {
    let (mut session, _controller, output) = create_test_session();
    assert_eq!(session.run_script(["pwd", "bogus", "quit", "pwd"]), 1);
    assert_eq!(output.lines()[0], "/");
    assert_eq!(output.lines().len(), 2);
    assert!(session.is_terminated());
}
