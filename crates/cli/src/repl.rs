//! REPL loop with rustyline.
//!
//! Interactive mode: prompt, history, TAB completion of command names.
//! Pipe mode: read lines from stdin, dispatch each.

use std::io::{self, BufRead};
use std::path::Path;

use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::{DefaultHistory, History};
use rustyline::validate::Validator;
use rustyline::{CompletionType, Config, Context, Editor, Helper};
use tracing::{debug, warn};

use mgmt_session::Session;

/// Run the interactive REPL until `quit` or end of input.
pub fn run_repl(session: &mut Session, history_path: Option<&Path>) -> Result<(), ReadlineError> {
    let config = Config::builder()
        .history_ignore_space(true)
        .completion_type(CompletionType::List)
        .build();

    let helper = ConsoleHelper::new(session);
    let mut rl: Editor<ConsoleHelper, DefaultHistory> = Editor::with_config(config)?;
    rl.set_helper(Some(helper));

    if let Some(path) = history_path {
        if let Err(e) = rl.load_history(path) {
            debug!(path = %path.display(), error = %e, "no history loaded");
        }
    }

    while !session.is_terminated() {
        let prompt = session.prompt();
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if !trimmed.is_empty() && session.history().is_enabled() {
                    let _ = rl.add_history_entry(trimmed);
                }
                session.process_line(trimmed);
                sync_cleared_history(session, rl.history_mut());
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C: just show a new prompt
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Failed to read the next line: {}", err);
                break;
            }
        }
    }

    if let Some(path) = history_path {
        if let Err(e) = rl.save_history(path) {
            warn!(path = %path.display(), error = %e, "failed to save history");
            eprintln!("Failed to save the history file {}: {}", path.display(), e);
        }
    }
    Ok(())
}

/// Mirror a `history --clear` into the editor's history, which is the copy
/// saved on exit.
fn sync_cleared_history<H: History>(session: &mut Session, history: &mut H) {
    if session.history_mut().take_cleared() {
        if let Err(e) = history.clear() {
            warn!(error = %e, "failed to clear editor history");
        }
    }
}

/// Run in pipe mode: dispatch every line of `input`. Returns the process exit
/// code: 1 when any line failed or the input could not be read.
pub fn run_pipe<R: BufRead>(session: &mut Session, input: R) -> i32 {
    let (failed, read_error) = dispatch_lines(session, input);
    if let Some(e) = &read_error {
        warn!(error = %e, "failed to read stdin");
        session.print_line(&format!("Failed to read standard input: {}", e));
    }
    if failed == 0 && read_error.is_none() {
        0
    } else {
        1
    }
}

/// Dispatch lines from `reader` until the session terminates or the input
/// ends, then terminate the session. Reading stops at the first read error,
/// which is returned next to the number of failed lines.
pub fn dispatch_lines<R: BufRead>(
    session: &mut Session,
    reader: R,
) -> (usize, Option<io::Error>) {
    let mut read_error = None;
    let lines = reader.lines().map_while(|line| match line {
        Ok(line) => Some(line),
        Err(e) => {
            read_error = Some(e);
            None
        }
    });
    let failed = session.run_script(lines);
    (failed, read_error)
}

// =========================================================================
// TAB Completion
// =========================================================================

struct ConsoleHelper {
    commands: Vec<String>,
}

impl ConsoleHelper {
    fn new(session: &Session) -> Self {
        Self {
            commands: session
                .registry()
                .names()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }

    fn candidates(&self, prefix: &str) -> Vec<Pair> {
        self.commands
            .iter()
            .filter(|cmd| cmd.starts_with(prefix))
            .map(|cmd| Pair {
                display: cmd.clone(),
                replacement: cmd.clone(),
            })
            .collect()
    }
}

impl Helper for ConsoleHelper {}
impl Validator for ConsoleHelper {}
impl Highlighter for ConsoleHelper {}
impl Hinter for ConsoleHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        None
    }
}

impl Completer for ConsoleHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line_to_pos = &line[..pos];
        let word = line_to_pos.trim_start();

        // Only the command name is completed; address expressions are not.
        if word.contains(char::is_whitespace) || word.starts_with(['.', ':', '/']) {
            return Ok((pos, vec![]));
        }
        Ok((pos - word.len(), self.candidates(word)))
    }
}
