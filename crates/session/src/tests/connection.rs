//! Connection tests: connect, reconnect, disconnect and shutdown.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use super::{create_connected_session, create_test_session};
use crate::{
    Address, CapturedOutput, CommandRegistry, Connection, Connector, Console, ControllerAddress,
    ControllerMode, Error, InMemoryController, Interrupt, Request, Result, Session, Value,
};

#[test]
fn test_connect_defaults() {
    let (mut session, controller, output) = create_test_session();
    session.process_line("connect");

    assert_eq!(
        output.lines(),
        vec!["Connected to standalone controller at localhost:9999"]
    );
    assert_eq!(controller.connects(), vec![("localhost".to_string(), 9999)]);
    let info = session.connection_info().unwrap();
    assert_eq!(info.mode, ControllerMode::Standalone);
    assert_eq!(controller.open_connections(), 1);
}

#[test]
fn test_connect_partial_addresses() {
    let (mut session, controller, _output) = create_test_session();
    session.dispatch("connect :1234").unwrap();
    session.dispatch("connect otherhost").unwrap();
    session.dispatch("connect [::1]:9990").unwrap();
    assert_eq!(
        controller.connects(),
        vec![
            ("localhost".to_string(), 1234),
            ("otherhost".to_string(), 9999),
            ("::1".to_string(), 9990),
        ]
    );
}

#[test]
fn test_connect_uses_session_default_controller() {
    let controller = InMemoryController::standalone();
    let output = CapturedOutput::new();
    let mut session = Session::new(
        Arc::new(CommandRegistry::builtin().unwrap()),
        Box::new(controller.clone()),
    )
    .with_console(Console::captured(&output))
    .with_default_controller(ControllerAddress::new("myhost", 1234));

    session.dispatch("connect").unwrap();
    assert_eq!(output.lines(), vec!["Connected to standalone controller at myhost:1234"]);
}

#[test]
fn test_reconnect_closes_previous_connection() {
    let (mut session, controller, _output) = create_connected_session();
    session.dispatch("connect otherhost:10000").unwrap();

    assert_eq!(controller.open_connections(), 1);
    let info = session.connection_info().unwrap();
    assert_eq!((info.host.as_str(), info.port), ("otherhost", 10000));
}

#[test]
fn test_domain_controller_detected() {
    let controller = InMemoryController::domain();
    let output = CapturedOutput::new();
    let mut session = Session::new(
        Arc::new(CommandRegistry::builtin().unwrap()),
        Box::new(controller),
    )
    .with_console(Console::captured(&output));

    session.dispatch("connect").unwrap();
    assert_eq!(
        session.connection_info().unwrap().mode,
        ControllerMode::Domain
    );
    assert_eq!(session.prompt(), "[domain@localhost:9999 /] ");
}

#[test]
fn test_failed_connect_keeps_previous_state() {
    let (mut session, controller, _output) = create_connected_session();
    controller.add_unknown_host("nowhere");

    let err = session.dispatch("connect nowhere").unwrap_err();
    assert!(matches!(err, Error::UnknownHost { .. }), "got {:?}", err);
    assert!(err.is_connection_error());
    assert_eq!(session.connection_info().unwrap().host, "localhost");
    assert_eq!(controller.open_connections(), 1);
}

#[test]
fn test_unreachable_controller() {
    let (mut session, controller, _output) = create_test_session();
    controller.set_unreachable(true);

    let result = session.dispatch("connect");
    assert!(matches!(result, Err(Error::Unreachable { .. })), "got {:?}", result);
    assert!(!session.is_connected());
}

#[test]
fn test_empty_controller_is_unavailable() {
    let controller = InMemoryController::new();
    let mut session = Session::new(
        Arc::new(CommandRegistry::builtin().unwrap()),
        Box::new(controller.clone()),
    )
    .with_console(Console::captured(&CapturedOutput::new()));

    let err = session.dispatch("connect").unwrap_err();
    assert_eq!(
        err.to_string(),
        "The controller is not available at localhost:9999"
    );
    assert!(!session.is_connected());
    assert_eq!(controller.open_connections(), 0);
}

#[test]
fn test_bad_port() {
    let (mut session, controller, _output) = create_test_session();
    let err = session.dispatch("connect myhost:abc").unwrap_err();
    assert_eq!(
        err.to_string(),
        "The port must be a valid non-negative integer: 'abc'"
    );
    assert!(controller.connects().is_empty());
}

#[test]
fn test_disconnect_and_quit() {
    let (mut session, controller, output) = create_connected_session();
    assert!(session.disconnect());
    assert_eq!(output.lines(), vec!["Closed connection to localhost:9999"]);
    assert!(!session.disconnect());
    assert_eq!(controller.open_connections(), 0);

    session.dispatch("quit").unwrap();
    assert!(session.is_terminated());
}

#[test]
fn test_shutdown_handle_closes_from_another_thread() {
    let (session, controller, _output) = create_connected_session();
    let handle = session.shutdown_handle();

    let closed = std::thread::spawn(move || handle.disconnect())
        .join()
        .unwrap();
    assert_eq!(closed.unwrap().port, 9999);
    assert!(!session.is_connected());
    assert_eq!(controller.open_connections(), 0);
}

#[test]
fn test_drop_closes_connection() {
    let (session, controller, _output) = create_connected_session();
    drop(session);
    assert_eq!(controller.open_connections(), 0);
}

// =============================================================================
// Closing while a request is in flight
// =============================================================================

/// Answers the connect probe at once and holds every other request for
/// `delay`, or until interrupted.
struct SlowConnector {
    delay: Duration,
    interruptible: bool,
    closes: Arc<AtomicUsize>,
}

struct SlowConnection {
    delay: Duration,
    interruptible: bool,
    interrupted: Arc<AtomicBool>,
    closes: Arc<AtomicUsize>,
}

impl Connector for SlowConnector {
    fn connect(&self, _host: &str, _port: u16) -> Result<Box<dyn Connection>> {
        Ok(Box::new(SlowConnection {
            delay: self.delay,
            interruptible: self.interruptible,
            interrupted: Arc::new(AtomicBool::new(false)),
            closes: Arc::clone(&self.closes),
        }))
    }
}

impl Connection for SlowConnection {
    fn execute(&mut self, request: &Request) -> Result<Value> {
        if request.operation == "read-children-types" {
            return Ok(Value::List(vec![Value::from("subsystem")]));
        }
        let started = Instant::now();
        while started.elapsed() < self.delay {
            if self.interrupted.load(Ordering::SeqCst) {
                return Err(Error::Transport {
                    reason: "connection interrupted".to_string(),
                });
            }
            thread::sleep(Duration::from_millis(5));
        }
        Ok(Value::Null)
    }

    fn execute_composite(&mut self, _requests: &[Request]) -> Result<Value> {
        self.execute(&Request::new(Address::root(), "composite"))
    }

    fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }

    fn interrupter(&self) -> Option<Interrupt> {
        if !self.interruptible {
            return None;
        }
        let interrupted = Arc::clone(&self.interrupted);
        Some(Box::new(move || interrupted.store(true, Ordering::SeqCst)))
    }
}

fn slow_session(delay: Duration, interruptible: bool) -> (Session, Arc<AtomicUsize>) {
    let closes = Arc::new(AtomicUsize::new(0));
    let connector = SlowConnector {
        delay,
        interruptible,
        closes: Arc::clone(&closes),
    };
    let mut session = Session::new(
        Arc::new(CommandRegistry::builtin().unwrap()),
        Box::new(connector),
    )
    .with_console(Console::captured(&CapturedOutput::new()));
    session.connect(None, None).unwrap();
    (session, closes)
}

#[test]
fn test_shutdown_does_not_wait_for_request_in_flight() {
    let (session, closes) = slow_session(Duration::from_secs(3), true);
    let handle = session.shutdown_handle();
    let worker = thread::spawn(move || {
        let result = session.execute(&Request::new(Address::root(), "read-resource"));
        (result, session)
    });

    thread::sleep(Duration::from_millis(200));
    let started = Instant::now();
    let closed = handle.disconnect();
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(closed.map(|info| info.port), Some(9999));

    let (result, session) = worker.join().unwrap();
    assert!(
        matches!(result, Err(Error::Transport { .. }) | Err(Error::NotConnected)),
        "got {:?}",
        result
    );
    assert!(!session.is_connected());
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[test]
fn test_connection_closed_during_call_is_released_when_call_returns() {
    let (session, closes) = slow_session(Duration::from_millis(500), false);
    let handle = session.shutdown_handle();
    let worker = thread::spawn(move || {
        let result = session.execute(&Request::new(Address::root(), "read-resource"));
        (result, session)
    });

    thread::sleep(Duration::from_millis(100));
    let started = Instant::now();
    assert!(handle.disconnect().is_some());
    assert!(started.elapsed() < Duration::from_millis(300));

    let (_result, session) = worker.join().unwrap();
    assert!(!session.is_connected());
    assert_eq!(closes.load(Ordering::SeqCst), 1);
    assert!(matches!(
        session.execute(&Request::new(Address::root(), "read-resource")),
        Err(Error::NotConnected)
    ));
}
