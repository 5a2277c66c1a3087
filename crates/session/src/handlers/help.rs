use crate::error::Result;
use crate::handler::{DispatchContext, Handler};
use crate::session::Session;

const OPERATION_SYNTAX: &[&str] = &[
    "",
    "An operation request has the form:",
    "  [/node-type=node-name (/node-type=node-name)*] : operation-name [( [parameter-name=parameter-value (,parameter-name=parameter-value)*] )]",
    "",
    "  '..' moves to the parent node, '.type' to the type of the current node.",
    "  A path without ':' changes the current node; relative paths start from it.",
];

/// `help`: lists the commands and the operation syntax.
pub struct HelpHandler;

impl Handler for HelpHandler {
    fn summary(&self) -> &str {
        "Print this message"
    }

    fn handle(&self, session: &mut Session, _ctx: &DispatchContext<'_>) -> Result<()> {
        let registry = std::sync::Arc::clone(session.registry());
        let rows: Vec<(String, &str)> = registry
            .registrations()
            .iter()
            .map(|r| (r.names().join(", "), r.handler().summary()))
            .collect();
        let width = rows.iter().map(|(names, _)| names.len()).max().unwrap_or(0);

        session.print_line("Supported commands:");
        for (names, summary) in &rows {
            session.print_line(&format!("  {:<width$}  {}", names, summary, width = width));
        }
        for line in OPERATION_SYNTAX {
            session.print_line(line);
        }
        Ok(())
    }

    fn batch_mode(&self) -> bool {
        false
    }
}
