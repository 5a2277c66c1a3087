//! Navigation and connection scenarios.

use mgmt::{Address, AddressContext, AddressStep, InMemoryController, OperationRequestParser};

use crate::{session_over, session_with_default};

#[test]
fn test_connect_cd_ls_quit() {
    let controller = InMemoryController::standalone();
    let (mut session, output) = session_with_default(&controller);

    let failed = session.run_script(["connect", "cd /subsystem=logging", "ls", "quit", "ls"]);

    assert_eq!(failed, 0);
    assert_eq!(
        output.lines(),
        vec![
            "Connected to standalone controller at myhost:1234",
            "console-handler",
            "logger",
        ]
    );
    assert_eq!(controller.connects(), vec![("myhost".to_string(), 1234)]);
    assert!(session.is_terminated());

    drop(session);
    assert_eq!(controller.open_connections(), 0);
}

#[test]
fn test_push_push_pop() {
    let mut ctx = AddressContext::new();
    ctx.push(AddressStep::new("subsystem", "logging"));
    ctx.push(AddressStep::new("logger", "root"));
    ctx.pop();
    assert_eq!(ctx.format(), "subsystem=logging");
    assert_eq!(
        ctx.address(),
        &Address::from_pairs([("subsystem", "logging")])
    );
}

#[test]
fn test_relative_and_absolute_paths() {
    let controller = InMemoryController::standalone();
    let (mut session, output) = session_over(&controller);

    for line in [
        "cd subsystem=logging",
        "cd logger=root",
        "pwd",
        "cd ../console-handler=CONSOLE",
        "pwd",
        "/interface=public",
        "pwd",
        "..",
        "pwd",
    ] {
        session.dispatch(line).unwrap();
    }

    assert_eq!(
        output.lines(),
        vec![
            "/subsystem=logging/logger=root",
            "/subsystem=logging/console-handler=CONSOLE",
            "/interface=public",
            "/",
        ]
    );
}

#[test]
fn test_parsed_request_formats_back_to_the_same_request() {
    let ctx = AddressContext::new();
    let request = OperationRequestParser::parse_request(
        "/subsystem=logging/logger=\"my app\":write-attribute(name=level,value=DEBUG)",
        &ctx,
    )
    .unwrap();
    let reparsed = OperationRequestParser::parse_request(&request.to_string(), &ctx).unwrap();
    assert_eq!(reparsed, request);
}

#[test]
fn test_operations_resolve_against_current_node() {
    let controller = InMemoryController::standalone();
    let (mut session, output) = session_over(&controller);
    session.dispatch("connect").unwrap();
    session.dispatch("cd subsystem=logging").unwrap();
    output.clear();

    session
        .dispatch("./logger=root:read-attribute(name=level)")
        .unwrap();
    session.dispatch("read-attribute level").unwrap();

    assert_eq!(output.lines(), vec!["\"INFO\"", "\"INFO\""]);
    let requests = controller.requests();
    let last_two = &requests[requests.len() - 2..];
    assert_eq!(
        last_two[0].address,
        Address::from_pairs([("subsystem", "logging"), ("logger", "root")])
    );
    assert_eq!(
        last_two[1].address,
        Address::from_pairs([("subsystem", "logging")])
    );
}
