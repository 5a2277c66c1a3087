use crate::error::{Error, Result};
use crate::handler::{DispatchContext, Handler};
use crate::history::HistoryFile;
use crate::session::Session;

/// `history [--clear | --disable | --enable | --file]`: shows or edits the
/// session history.
pub struct HistoryHandler;

impl Handler for HistoryHandler {
    fn summary(&self) -> &str {
        "Print or edit the command history: history [--clear|--disable|--enable|--file]"
    }

    fn handle(&self, session: &mut Session, ctx: &DispatchContext<'_>) -> Result<()> {
        let args = ctx.parsed_arguments()?;
        args.check_allowed(&["clear", "disable", "enable", "file"])?;
        args.check_max_positionals(0)?;

        let flags = ["clear", "disable", "enable", "file"]
            .iter()
            .filter(|f| args.has_switch(f))
            .count();
        if flags > 1 {
            return Err(Error::invalid_arguments(
                "Only one of '--clear', '--disable', '--enable' or '--file' can be given.",
            ));
        }

        if args.has_switch("clear") {
            session.history_mut().clear();
        } else if args.has_switch("disable") {
            session.history_mut().set_enabled(false);
        } else if args.has_switch("enable") {
            session.history_mut().set_enabled(true);
        } else if args.has_switch("file") {
            let text = match session.extensions().get::<HistoryFile>() {
                Some(HistoryFile(path)) => path.display().to_string(),
                None => "History is not saved to a file.".to_string(),
            };
            session.print_line(&text);
        } else {
            let entries = session.history().entries().to_vec();
            for entry in &entries {
                session.print_line(entry);
            }
            if !session.history().is_enabled() {
                session.print_line("(history is disabled)");
            }
        }
        Ok(())
    }

    fn batch_mode(&self) -> bool {
        false
    }
}
