use crate::error::Result;
use crate::handler::{DispatchContext, Handler};
use crate::session::Session;

/// `quit`: ends the input loop.
pub struct QuitHandler;

impl Handler for QuitHandler {
    fn summary(&self) -> &str {
        "Quit the command line interface"
    }

    fn handle(&self, session: &mut Session, _ctx: &DispatchContext<'_>) -> Result<()> {
        session.terminate();
        Ok(())
    }

    fn batch_mode(&self) -> bool {
        false
    }
}
