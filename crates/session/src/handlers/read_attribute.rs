use mgmt_core::{OperationRequestParser, Request};

use crate::error::{Error, Result};
use crate::handler::{DispatchContext, Handler, OperationCommand};
use crate::session::Session;

/// `read-attribute <name> [--node=path]`: reads one attribute of the current
/// node, or of `path`. Can be captured into a batch.
pub struct ReadAttributeHandler;

impl Handler for ReadAttributeHandler {
    fn summary(&self) -> &str {
        "Read an attribute value: read-attribute <name> [--node=node-path]"
    }

    fn handle(&self, session: &mut Session, ctx: &DispatchContext<'_>) -> Result<()> {
        let request = self.build_request(session, ctx)?;
        let value = session.execute(&request)?;
        session.print_value(&value);
        Ok(())
    }

    fn operation(&self) -> Option<&dyn OperationCommand> {
        Some(self)
    }
}

impl OperationCommand for ReadAttributeHandler {
    fn build_request(&self, session: &Session, ctx: &DispatchContext<'_>) -> Result<Request> {
        let args = ctx.parsed_arguments()?;
        args.check_allowed(&["node"])?;
        args.check_max_positionals(1)?;
        let name = args
            .positional(0)
            .ok_or_else(|| Error::invalid_arguments("Required argument 'name' is missing."))?;

        let address =
            OperationRequestParser::parse_address(args.option("node").unwrap_or(""), session.address())?;
        if let Some(step) = address.steps().iter().find(|s| !s.is_named()) {
            return Err(Error::invalid_arguments(format!(
                "Node name not specified for type '{}'.",
                step.node_type
            )));
        }
        Ok(Request::new(address, "read-attribute").with_param("name", name))
    }
}
