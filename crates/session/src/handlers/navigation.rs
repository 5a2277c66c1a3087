use mgmt_core::{Address, OperationRequestParser, Request};

use crate::error::Result;
use crate::handler::{DispatchContext, Handler};
use crate::session::Session;

/// `cd [path]`: changes the current node. Without a path prints it.
pub struct CdHandler;

impl Handler for CdHandler {
    fn summary(&self) -> &str {
        "Change the current node path: cd [node-path]"
    }

    fn handle(&self, session: &mut Session, ctx: &DispatchContext<'_>) -> Result<()> {
        match ctx.arguments {
            None => {
                let current = session.address().address().to_string();
                session.print_line(&current);
            }
            Some(path) => {
                let address = OperationRequestParser::parse_address(path, session.address())?;
                session.address_mut().replace(address);
            }
        }
        Ok(())
    }

    fn batch_mode(&self) -> bool {
        false
    }
}

/// `ls [path]`: lists the child types of a node, or the child names when the
/// path ends with a node type.
pub struct LsHandler;

impl LsHandler {
    fn listing_request(address: &Address) -> Request {
        match address.last() {
            Some(step) if !step.is_named() => Request::new(address.parent(), "read-children-names")
                .with_param("child-type", step.node_type.as_str()),
            _ => Request::new(address.clone(), "read-children-types"),
        }
    }
}

impl Handler for LsHandler {
    fn summary(&self) -> &str {
        "List the contents of a node: ls [node-path]"
    }

    fn handle(&self, session: &mut Session, ctx: &DispatchContext<'_>) -> Result<()> {
        let address =
            OperationRequestParser::parse_address(ctx.raw_arguments(), session.address())?;
        let request = Self::listing_request(&address);
        let result = session.execute(&request)?;
        session.print_columns(&result.string_items());
        Ok(())
    }

    fn batch_mode(&self) -> bool {
        false
    }
}

/// `pwd`: prints the absolute path of the current node.
pub struct PwdHandler;

impl Handler for PwdHandler {
    fn summary(&self) -> &str {
        "Print the full path of the current node"
    }

    fn handle(&self, session: &mut Session, _ctx: &DispatchContext<'_>) -> Result<()> {
        let current = session.address().address().to_string();
        session.print_line(&current);
        Ok(())
    }

    fn batch_mode(&self) -> bool {
        false
    }
}
