//! Test modules for the session crate.

use std::sync::Arc;

use crate::{CapturedOutput, CommandRegistry, Console, InMemoryController, Session};

pub mod connection;
pub mod handlers;

/// Create a disconnected session over a standalone in-memory controller,
/// writing into a capture buffer.
fn create_test_session() -> (Session, InMemoryController, CapturedOutput) {
    let controller = InMemoryController::standalone();
    let output = CapturedOutput::new();
    let registry = Arc::new(CommandRegistry::builtin().unwrap());
    let session = Session::new(registry, Box::new(controller.clone()))
        .with_console(Console::captured(&output));
    (session, controller, output)
}

/// Same as [`create_test_session`], already connected to the default
/// controller. The connect notice is cleared from the output.
fn create_connected_session() -> (Session, InMemoryController, CapturedOutput) {
    let (mut session, controller, output) = create_test_session();
    session.dispatch("connect").unwrap();
    output.clear();
    (session, controller, output)
}
