use crate::endpoint::ControllerAddress;
use crate::error::Result;
use crate::handler::{DispatchContext, Handler};
use crate::session::Session;

/// `connect [host][:port]`: connects to a controller, filling missing parts
/// from the session defaults.
pub struct ConnectHandler;

impl Handler for ConnectHandler {
    fn summary(&self) -> &str {
        "Connect to the controller: connect [host][:port]"
    }

    fn handle(&self, session: &mut Session, ctx: &DispatchContext<'_>) -> Result<()> {
        let (host, port) = ControllerAddress::parse_partial(ctx.raw_arguments())?;
        session.connect(host, port)
    }

    fn batch_mode(&self) -> bool {
        false
    }
}
