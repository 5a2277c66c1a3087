//! Line classification.
//!
//! Every input line is one of:
//! - blank, which is ignored
//! - a navigation path such as `..` or `/subsystem=logging`
//! - an operation expression such as `/subsystem=logging:read-resource`
//! - a named command such as `ls subsystem`

use mgmt_core::find_operation_separator;

/// The kind of a trimmed input line, borrowing from the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifiedLine<'a> {
    /// Blank line
    Empty,
    /// Address expression without an operation
    Navigation(&'a str),
    /// Address expression with an operation
    Operation(&'a str),
    /// Named command and its trimmed argument string
    Command {
        /// Command name as typed
        name: &'a str,
        /// Trimmed arguments, if any
        arguments: Option<&'a str>,
    },
}

/// Classify one input line.
///
/// A line starting with `.`, `:` or `/` is an address expression. It is an
/// operation when it contains a `:` outside double quotes, otherwise a
/// navigation. Anything else is a named command: the leading run of
/// non-whitespace is the name and the rest, if any, the arguments.
pub fn classify(line: &str) -> ClassifiedLine<'_> {
    let line = line.trim();
    if line.is_empty() {
        return ClassifiedLine::Empty;
    }

    if line.starts_with(['.', ':', '/']) {
        return if find_operation_separator(line).is_some() {
            ClassifiedLine::Operation(line)
        } else {
            ClassifiedLine::Navigation(line)
        };
    }

    match line.split_once(char::is_whitespace) {
        Some((name, rest)) => {
            let rest = rest.trim();
            ClassifiedLine::Command {
                name,
                arguments: if rest.is_empty() { None } else { Some(rest) },
            }
        }
        None => ClassifiedLine::Command {
            name: line,
            arguments: None,
        },
    }
}
