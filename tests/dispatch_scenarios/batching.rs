//! Batch composition scenarios.

use mgmt::{
    Address, CommandRegistry, DispatchContext, Error, Handler, InMemoryController,
    OperationCommand, Request, Result, Session,
};

use crate::{session_over, session_with_registry};

/// `log-level LEVEL` writes the root logger level.
struct LogLevel;

impl Handler for LogLevel {
    fn summary(&self) -> &str {
        "set the root logger level"
    }

    fn handle(&self, session: &mut Session, ctx: &DispatchContext<'_>) -> Result<()> {
        let request = self.build_request(session, ctx)?;
        let result = session.execute(&request)?;
        session.print_value(&result);
        Ok(())
    }

    fn batch_mode(&self) -> bool {
        true
    }

    fn operation(&self) -> Option<&dyn OperationCommand> {
        Some(self)
    }
}

impl OperationCommand for LogLevel {
    fn build_request(&self, _session: &Session, ctx: &DispatchContext<'_>) -> Result<Request> {
        let args = ctx.parsed_arguments()?;
        let level = args
            .positional(0)
            .ok_or_else(|| Error::invalid_arguments("Required argument 'level' is missing."))?;
        Ok(Request::new(
            Address::from_pairs([("subsystem", "logging"), ("logger", "root")]),
            "write-attribute",
        )
        .with_param("name", "level")
        .with_param("value", level))
    }
}

fn batch_texts(session: &Session) -> Vec<String> {
    session
        .batches()
        .active()
        .map(|b| b.commands().iter().map(|c| c.text().to_string()).collect())
        .unwrap_or_default()
}

#[test]
fn test_captured_operation_is_echoed_with_its_line_number() {
    let controller = InMemoryController::standalone();
    let (mut session, output) = session_over(&controller);
    session.dispatch("batch").unwrap();
    session
        .dispatch("/subsystem=datasources:add(name=foo)")
        .unwrap();
    assert_eq!(output.lines(), vec!["#1 /subsystem=datasources:add(name=foo)"]);
    assert!(controller.requests().is_empty());
}

#[test]
fn test_appended_operations_run_as_one_composite() {
    let controller = InMemoryController::standalone();
    let (mut session, output) = session_over(&controller);

    let failed = session.run_script([
        "connect",
        "batch",
        "/subsystem=datasources/data-source=a:add",
        "/subsystem=datasources/data-source=b:add",
        "cd subsystem=logging",
        ":write-attribute(name=level,value=WARN)",
        "run-batch",
    ]);

    assert_eq!(failed, 0);
    assert_eq!(
        output.lines(),
        vec![
            "Connected to standalone controller at localhost:9999",
            "#1 /subsystem=datasources/data-source=a:add",
            "#2 /subsystem=datasources/data-source=b:add",
            "#3 /subsystem=logging:write-attribute(name=level,value=WARN)",
            "The batch executed successfully",
        ]
    );
    let composites = controller.composites();
    assert_eq!(composites.len(), 1);
    let operations: Vec<_> = composites[0].iter().map(|r| r.operation.as_str()).collect();
    assert_eq!(operations, vec!["add", "add", "write-attribute"]);
    assert!(controller
        .node(&Address::from_pairs([
            ("subsystem", "datasources"),
            ("data-source", "b"),
        ]))
        .is_some());
    assert!(controller
        .requests()
        .iter()
        .all(|r| r.operation != "add" && r.operation != "write-attribute"));
}

#[test]
fn test_discard_then_list() {
    let controller = InMemoryController::standalone();
    let (mut session, output) = session_over(&controller);
    session.dispatch("batch").unwrap();
    session.dispatch(":read-resource").unwrap();
    session.dispatch("discard-batch").unwrap();
    output.clear();

    let result = session.dispatch("list-batch");
    assert!(output.lines().is_empty());
    assert!(matches!(result, Err(Error::NoActiveBatch)), "got {:?}", result);
    assert!(!session.batches().is_active());
}

#[test]
fn test_remove_renumbers_remaining_lines() {
    let controller = InMemoryController::standalone();
    let (mut session, output) = session_over(&controller);
    session.dispatch("batch").unwrap();
    for node in ["a", "b", "c"] {
        session
            .dispatch(&format!("/subsystem={}:add", node))
            .unwrap();
    }
    session.dispatch("remove-batch-line 1").unwrap();
    output.clear();

    session.dispatch("list-batch").unwrap();
    assert_eq!(
        output.lines(),
        vec!["#1 /subsystem=b:add", "#2 /subsystem=c:add"]
    );
}

#[test]
fn test_eligibility_override_runs_handler_immediately_outside_batch_only() {
    let controller = InMemoryController::standalone();
    let registry = CommandRegistry::builder()
        .builtins()
        .register(LogLevel, &["log-level"])
        .register_with(LogLevel, false, &["log-level-now"])
        .build()
        .unwrap();
    let (mut session, output) = session_with_registry(&controller, registry);
    session.dispatch("connect").unwrap();
    session.dispatch("batch").unwrap();
    output.clear();

    session.dispatch("log-level DEBUG").unwrap();
    let result = session.dispatch("log-level-now DEBUG");
    assert!(matches!(result, Err(Error::NotAllowedInBatch)), "got {:?}", result);
    assert_eq!(output.lines(), vec!["#1 log-level DEBUG"]);
    assert_eq!(batch_texts(&session), vec!["log-level DEBUG"]);

    session.dispatch("discard-batch").unwrap();
    session.dispatch("log-level-now TRACE").unwrap();
    let root_logger = controller
        .node(&Address::from_pairs([("subsystem", "logging"), ("logger", "root")]))
        .unwrap();
    assert_eq!(
        root_logger.attributes.get("level"),
        Some(&mgmt::Value::from("TRACE"))
    );
}

#[test]
fn test_failed_batch_leaves_controller_untouched() {
    let controller = InMemoryController::standalone();
    controller.fail_operation("add", "duplicate resource");
    let (mut session, _output) = session_over(&controller);
    session.dispatch("connect").unwrap();
    session.dispatch("batch").unwrap();
    session
        .dispatch("/subsystem=logging:write-attribute(name=level,value=ERROR)")
        .unwrap();
    session.dispatch("/subsystem=datasources/data-source=a:add").unwrap();

    let result = session.dispatch("run-batch");
    assert!(result.is_err());
    assert!(session.batches().is_active());
    let logging = controller
        .node(&Address::from_pairs([("subsystem", "logging")]))
        .unwrap();
    assert_eq!(logging.attributes.get("level"), Some(&mgmt::Value::from("INFO")));
}
