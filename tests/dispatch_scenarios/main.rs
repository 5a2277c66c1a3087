//! Dispatch Scenario Test Suite
//!
//! End-to-end scenarios driving a [`mgmt::Session`] line by line against the
//! in-memory controller, the way a script or a user at the prompt would.
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all scenarios
//! cargo test --test dispatch_scenarios
//!
//! # Run batch scenarios only
//! cargo test --test dispatch_scenarios batching::
//! ```

use std::sync::Arc;

use mgmt::{
    CapturedOutput, CommandRegistry, Console, ControllerAddress, InMemoryController, Session,
};

mod batching;
mod classification;
mod navigation;
mod scripts;

/// A disconnected session over `controller`, writing into a fresh buffer.
fn session_over(controller: &InMemoryController) -> (Session, CapturedOutput) {
    session_with_registry(controller, CommandRegistry::builtin().unwrap())
}

fn session_with_registry(
    controller: &InMemoryController,
    registry: CommandRegistry,
) -> (Session, CapturedOutput) {
    let output = CapturedOutput::new();
    let session = Session::new(Arc::new(registry), Box::new(controller.clone()))
        .with_console(Console::captured(&output));
    (session, output)
}

/// Same as [`session_over`], with `myhost:1234` as the default controller.
fn session_with_default(controller: &InMemoryController) -> (Session, CapturedOutput) {
    let (session, output) = session_over(controller);
    (
        session.with_default_controller(ControllerAddress::new("myhost", 1234)),
        output,
    )
}
