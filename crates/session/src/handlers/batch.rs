//! Batch control and batch editing commands.
//!
//! None of these can themselves be captured into a batch: they act on the
//! batch being composed.

use crate::error::{Error, Result};
use crate::handler::{DispatchContext, Handler};
use crate::session::Session;

fn parse_line_number(text: &str) -> Result<usize> {
    text.parse::<usize>()
        .map_err(|_| Error::invalid_arguments(format!("Failed to parse line number '{}'.", text)))
}

fn print_batch_lines(session: &mut Session) -> Result<()> {
    let lines: Vec<String> = {
        let batch = session.batches().active().ok_or(Error::NoActiveBatch)?;
        if batch.is_empty() {
            return Err(Error::EmptyBatch);
        }
        batch
            .commands()
            .iter()
            .enumerate()
            .map(|(i, c)| format!("#{} {}", i + 1, c.text()))
            .collect()
    };
    for line in &lines {
        session.print_line(line);
    }
    Ok(())
}

/// `batch [name] | batch -l`
///
/// Without arguments re-activates the unnamed held batch when there is one,
/// otherwise starts a new batch. With a name re-activates that held batch.
/// `-l` lists the names of held batches.
pub struct BatchHandler;

impl Handler for BatchHandler {
    fn summary(&self) -> &str {
        "Start a batch, re-activate a held back one, or list held batches: batch [name] | batch -l"
    }

    fn handle(&self, session: &mut Session, ctx: &DispatchContext<'_>) -> Result<()> {
        let args = ctx.parsed_arguments()?;
        args.check_allowed(&["l"])?;
        args.check_max_positionals(1)?;

        if args.has_switch("l") {
            if !args.positionals().is_empty() {
                return Err(Error::invalid_arguments(
                    "'-l' cannot be combined with a batch name.",
                ));
            }
            let mut names = session.batches().held_names();
            if session.batches().has_unnamed_held() {
                names.insert(0, "<unnamed>".to_string());
            }
            session.print_columns(&names);
            return Ok(());
        }

        if session.batches().is_active() {
            return Err(Error::BatchAlreadyActive);
        }

        let name = args.positional(0);
        if name.is_none() && !session.batches().has_unnamed_held() {
            session.batches_mut().begin()?;
            return Ok(());
        }

        let resumed = session.batches_mut().resume(name)?.len();
        match name {
            Some(name) => session.print_line(&format!("Re-activated batch '{}'", name)),
            None => session.print_line("Re-activated batch"),
        }
        if resumed > 0 {
            print_batch_lines(session)?;
        }
        Ok(())
    }

    fn batch_mode(&self) -> bool {
        false
    }
}

/// `discard-batch`: leaves batch mode, dropping the active batch.
pub struct BatchDiscardHandler;

impl Handler for BatchDiscardHandler {
    fn summary(&self) -> &str {
        "Discard the active batch and leave batch mode"
    }

    fn handle(&self, session: &mut Session, ctx: &DispatchContext<'_>) -> Result<()> {
        ctx.parsed_arguments()?.check_max_positionals(0)?;
        session.batches_mut().discard()?;
        Ok(())
    }

    fn batch_mode(&self) -> bool {
        false
    }
}

/// `list-batch`
pub struct BatchListHandler;

impl Handler for BatchListHandler {
    fn summary(&self) -> &str {
        "List the commands of the active batch"
    }

    fn handle(&self, session: &mut Session, _ctx: &DispatchContext<'_>) -> Result<()> {
        print_batch_lines(session)
    }

    fn batch_mode(&self) -> bool {
        false
    }
}

/// `clear-batch`: removes every command but stays in batch mode.
pub struct BatchClearHandler;

impl Handler for BatchClearHandler {
    fn summary(&self) -> &str {
        "Remove all commands from the active batch"
    }

    fn handle(&self, session: &mut Session, _ctx: &DispatchContext<'_>) -> Result<()> {
        session.batches_mut().active_mut()?.clear();
        Ok(())
    }

    fn batch_mode(&self) -> bool {
        false
    }
}

/// `holdback-batch [name]`
pub struct BatchHoldbackHandler;

impl Handler for BatchHoldbackHandler {
    fn summary(&self) -> &str {
        "Hold the active batch back for later: holdback-batch [name]"
    }

    fn handle(&self, session: &mut Session, ctx: &DispatchContext<'_>) -> Result<()> {
        let args = ctx.parsed_arguments()?;
        args.check_allowed(&[])?;
        args.check_max_positionals(1)?;
        session.batches_mut().holdback(args.positional(0))
    }

    fn batch_mode(&self) -> bool {
        false
    }
}

/// `run-batch`: submits the active batch as one composite operation.
pub struct BatchRunHandler;

impl Handler for BatchRunHandler {
    fn summary(&self) -> &str {
        "Execute the active batch as a single composite operation"
    }

    fn handle(&self, session: &mut Session, _ctx: &DispatchContext<'_>) -> Result<()> {
        session.run_batch()?;
        session.print_line("The batch executed successfully");
        Ok(())
    }

    fn batch_mode(&self) -> bool {
        false
    }
}

/// `remove-batch-line <n>`
pub struct BatchRemoveLineHandler;

impl Handler for BatchRemoveLineHandler {
    fn summary(&self) -> &str {
        "Remove a line from the active batch: remove-batch-line <n>"
    }

    fn handle(&self, session: &mut Session, ctx: &DispatchContext<'_>) -> Result<()> {
        let args = ctx.parsed_arguments()?;
        args.check_allowed(&[])?;
        args.check_max_positionals(1)?;
        let line = args
            .positional(0)
            .ok_or_else(|| Error::invalid_arguments("Missing line number."))?;
        let line = parse_line_number(line)?;
        session.batches_mut().active_mut()?.remove(line)?;
        Ok(())
    }

    fn batch_mode(&self) -> bool {
        false
    }
}

/// `move-batch-line <from> <to>`
pub struct BatchMoveLineHandler;

impl Handler for BatchMoveLineHandler {
    fn summary(&self) -> &str {
        "Move a line of the active batch: move-batch-line <from> <to>"
    }

    fn handle(&self, session: &mut Session, ctx: &DispatchContext<'_>) -> Result<()> {
        let args = ctx.parsed_arguments()?;
        args.check_allowed(&[])?;
        args.check_max_positionals(2)?;
        let (from, to) = match (args.positional(0), args.positional(1)) {
            (Some(from), Some(to)) => (parse_line_number(from)?, parse_line_number(to)?),
            _ => {
                return Err(Error::invalid_arguments(
                    "Expected the current and the new line number.",
                ))
            }
        };
        session.batches_mut().active_mut()?.move_line(from, to)
    }

    fn batch_mode(&self) -> bool {
        false
    }
}

/// `edit-batch-line <n> <line>`: replaces line `n` with a newly parsed line.
///
/// The replacement goes through the same conversion as a line typed in batch
/// mode, so it must be an operation or a batchable command.
pub struct BatchEditLineHandler;

impl Handler for BatchEditLineHandler {
    fn summary(&self) -> &str {
        "Replace a line of the active batch: edit-batch-line <n> <line>"
    }

    fn handle(&self, session: &mut Session, ctx: &DispatchContext<'_>) -> Result<()> {
        let raw = ctx.raw_arguments();
        let (number, rest) = match raw.split_once(char::is_whitespace) {
            Some((number, rest)) if !rest.trim().is_empty() => (number, rest.trim()),
            _ => {
                return Err(Error::invalid_arguments(
                    "Expected a line number and the new line.",
                ))
            }
        };
        let line = parse_line_number(number)?;
        if !session.batches().is_active() {
            return Err(Error::NoActiveBatch);
        }
        let command = session.to_batched_command(rest)?;
        let text = command.text().to_string();
        session.batches_mut().active_mut()?.replace(line, command)?;
        session.print_line(&format!("#{} {}", line, text));
        Ok(())
    }

    fn batch_mode(&self) -> bool {
        false
    }
}
