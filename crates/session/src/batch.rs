//! Batches of requests composed for atomic submission.
//!
//! # State machine
//!
//! ```text
//!            begin / resume
//!   INACTIVE ───────────────▶ ACTIVE
//!      ▲                        │
//!      └─── discard / holdback ─┘   (run succeeds ⇒ discard)
//! ```
//!
//! While ACTIVE, operation lines and batch-capable commands are appended to
//! the active [`Batch`] instead of being executed. Held back batches survive
//! while another batch is composed and can be resumed by name.
//!
//! Line numbers in every public method are 1-based, as displayed to the user.

use std::collections::BTreeMap;

use mgmt_core::Request;

use crate::error::{Error, Result};

/// One captured command: the text shown to the user and the request it built.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchedCommand {
    text: String,
    request: Request,
}

impl BatchedCommand {
    /// Create a batched command.
    pub fn new(text: impl Into<String>, request: Request) -> Self {
        Self {
            text: text.into(),
            request,
        }
    }

    /// Display text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The captured request.
    pub fn request(&self) -> &Request {
        &self.request
    }
}

/// Ordered, editable list of batched commands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    name: Option<String>,
    commands: Vec<BatchedCommand>,
}

impl Batch {
    /// An empty anonymous batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Name given when the batch was held back.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Number of commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the batch holds no commands.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Commands in submission order.
    pub fn commands(&self) -> &[BatchedCommand] {
        &self.commands
    }

    /// Command at 1-based line `line`.
    pub fn get(&self, line: usize) -> Option<&BatchedCommand> {
        line.checked_sub(1).and_then(|i| self.commands.get(i))
    }

    /// Requests in submission order.
    pub fn requests(&self) -> Vec<Request> {
        self.commands.iter().map(|c| c.request.clone()).collect()
    }

    /// Append a command and return its line number.
    pub fn append(&mut self, command: BatchedCommand) -> usize {
        self.commands.push(command);
        self.commands.len()
    }

    /// Insert a command so that it becomes line `line`. `len + 1` appends.
    pub fn insert(&mut self, line: usize, command: BatchedCommand) -> Result<()> {
        if line == 0 || line > self.commands.len() + 1 {
            return Err(self.out_of_range(line));
        }
        self.commands.insert(line - 1, command);
        Ok(())
    }

    /// Remove line `line`; later lines move up by one.
    pub fn remove(&mut self, line: usize) -> Result<BatchedCommand> {
        let index = self.index(line)?;
        Ok(self.commands.remove(index))
    }

    /// Move line `from` so that it becomes line `to`.
    pub fn move_line(&mut self, from: usize, to: usize) -> Result<()> {
        let from_index = self.index(from)?;
        let to_index = self.index(to)?;
        let command = self.commands.remove(from_index);
        self.commands.insert(to_index, command);
        Ok(())
    }

    /// Replace line `line`, returning the previous command.
    pub fn replace(&mut self, line: usize, command: BatchedCommand) -> Result<BatchedCommand> {
        let index = self.index(line)?;
        Ok(std::mem::replace(&mut self.commands[index], command))
    }

    /// Remove every command.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    fn index(&self, line: usize) -> Result<usize> {
        if line == 0 || line > self.commands.len() {
            return Err(self.out_of_range(line));
        }
        Ok(line - 1)
    }

    fn out_of_range(&self, line: usize) -> Error {
        Error::LineOutOfRange {
            line,
            len: self.commands.len(),
        }
    }
}

/// Owns the active batch and the held back ones.
#[derive(Debug, Default)]
pub struct BatchManager {
    active: Option<Batch>,
    held_unnamed: Option<Batch>,
    held: BTreeMap<String, Batch>,
}

impl BatchManager {
    /// A manager with no active or held batches.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a batch is being composed.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// The batch being composed.
    pub fn active(&self) -> Option<&Batch> {
        self.active.as_ref()
    }

    /// Mutable access to the batch being composed.
    pub fn active_mut(&mut self) -> Result<&mut Batch> {
        self.active.as_mut().ok_or(Error::NoActiveBatch)
    }

    /// INACTIVE → ACTIVE with a new empty batch.
    pub fn begin(&mut self) -> Result<()> {
        if self.active.is_some() {
            return Err(Error::BatchAlreadyActive);
        }
        self.active = Some(Batch::new());
        Ok(())
    }

    /// ACTIVE → INACTIVE, keeping the batch under `name` (or as the unnamed
    /// held batch) for a later [`resume`](Self::resume).
    pub fn holdback(&mut self, name: Option<&str>) -> Result<()> {
        if self.active.is_none() {
            return Err(Error::NoActiveBatch);
        }
        let exists = match name {
            Some(name) => self.held.contains_key(name),
            None => self.held_unnamed.is_some(),
        };
        if exists {
            return Err(Error::HeldBatchExists {
                name: name.map(str::to_string),
            });
        }

        let Some(mut batch) = self.active.take() else {
            return Err(Error::NoActiveBatch);
        };
        batch.name = name.map(str::to_string);
        match name {
            Some(name) => {
                self.held.insert(name.to_string(), batch);
            }
            None => self.held_unnamed = Some(batch),
        }
        Ok(())
    }

    /// INACTIVE → ACTIVE with a held back batch.
    pub fn resume(&mut self, name: Option<&str>) -> Result<&Batch> {
        if self.active.is_some() {
            return Err(Error::BatchAlreadyActive);
        }
        let batch = match name {
            Some(name) => self.held.remove(name),
            None => self.held_unnamed.take(),
        };
        match batch {
            Some(batch) => Ok(self.active.insert(batch)),
            None => Err(Error::NoHeldBatch {
                name: name.map(str::to_string),
            }),
        }
    }

    /// ACTIVE → INACTIVE, dropping the batch.
    pub fn discard(&mut self) -> Result<Batch> {
        self.active.take().ok_or(Error::NoActiveBatch)
    }

    /// Whether an unnamed batch is held back.
    pub fn has_unnamed_held(&self) -> bool {
        self.held_unnamed.is_some()
    }

    /// Names of the held back batches, sorted.
    pub fn held_names(&self) -> Vec<String> {
        self.held.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mgmt_core::Address;

    fn cmd(op: &str) -> BatchedCommand {
        BatchedCommand::new(format!("/:{}", op), Request::new(Address::root(), op))
    }

    fn ops(batch: &Batch) -> Vec<&str> {
        batch
            .commands()
            .iter()
            .map(|c| c.request().operation.as_str())
            .collect()
    }

    #[test]
    fn test_append_returns_line_numbers() {
        let mut batch = Batch::new();
        assert_eq!(batch.append(cmd("a")), 1);
        assert_eq!(batch.append(cmd("b")), 2);
        assert_eq!(batch.get(2).unwrap().text(), "/:b");
        assert!(batch.get(0).is_none());
    }

    #[test]
    fn test_remove_renumbers() {
        let mut batch = Batch::new();
        for op in ["a", "b", "c"] {
            batch.append(cmd(op));
        }
        let removed = batch.remove(2).unwrap();
        assert_eq!(removed.request().operation, "b");
        assert_eq!(ops(&batch), vec!["a", "c"]);
        assert_eq!(batch.get(2).unwrap().request().operation, "c");
    }

    #[test]
    fn test_move_insert_replace() {
        let mut batch = Batch::new();
        for op in ["a", "b", "c"] {
            batch.append(cmd(op));
        }
        batch.move_line(3, 1).unwrap();
        assert_eq!(ops(&batch), vec!["c", "a", "b"]);
        batch.move_line(1, 3).unwrap();
        assert_eq!(ops(&batch), vec!["a", "b", "c"]);

        batch.insert(4, cmd("d")).unwrap();
        batch.insert(1, cmd("z")).unwrap();
        assert_eq!(ops(&batch), vec!["z", "a", "b", "c", "d"]);

        let old = batch.replace(2, cmd("y")).unwrap();
        assert_eq!(old.request().operation, "a");
        assert_eq!(ops(&batch), vec!["z", "y", "b", "c", "d"]);
    }

    #[test]
    fn test_out_of_range_does_not_mutate() {
        let mut batch = Batch::new();
        batch.append(cmd("a"));
        let before = batch.clone();

        assert_eq!(
            batch.remove(0).unwrap_err(),
            Error::LineOutOfRange { line: 0, len: 1 }
        );
        assert!(batch.remove(2).is_err());
        assert!(batch.move_line(1, 2).is_err());
        assert!(batch.insert(3, cmd("x")).is_err());
        assert!(batch.replace(5, cmd("x")).is_err());
        assert_eq!(batch, before);
    }

    #[test]
    fn test_manager_begin_discard() {
        let mut manager = BatchManager::new();
        assert!(!manager.is_active());
        manager.begin().unwrap();
        assert_eq!(manager.begin().unwrap_err(), Error::BatchAlreadyActive);
        manager.active_mut().unwrap().append(cmd("a"));
        let dropped = manager.discard().unwrap();
        assert_eq!(dropped.len(), 1);
        assert!(!manager.is_active());
        assert_eq!(manager.discard().unwrap_err(), Error::NoActiveBatch);
    }

    #[test]
    fn test_holdback_and_resume() {
        let mut manager = BatchManager::new();
        manager.begin().unwrap();
        manager.active_mut().unwrap().append(cmd("a"));
        manager.holdback(Some("first")).unwrap();
        assert!(!manager.is_active());

        manager.begin().unwrap();
        manager.active_mut().unwrap().append(cmd("b"));
        manager.holdback(None).unwrap();
        assert!(manager.has_unnamed_held());
        assert_eq!(manager.held_names(), vec!["first".to_string()]);

        let resumed = manager.resume(Some("first")).unwrap();
        assert_eq!(resumed.name(), Some("first"));
        assert_eq!(ops(resumed), vec!["a"]);
        assert!(manager.is_active());
        assert!(manager.held_names().is_empty());
    }

    #[test]
    fn test_holdback_errors() {
        let mut manager = BatchManager::new();
        assert_eq!(manager.holdback(None).unwrap_err(), Error::NoActiveBatch);

        manager.begin().unwrap();
        manager.holdback(Some("x")).unwrap();
        manager.begin().unwrap();
        assert_eq!(
            manager.holdback(Some("x")).unwrap_err(),
            Error::HeldBatchExists {
                name: Some("x".into())
            }
        );
        assert!(manager.is_active());

        manager.discard().unwrap();
        assert_eq!(
            manager.resume(Some("missing")).unwrap_err(),
            Error::NoHeldBatch {
                name: Some("missing".into())
            }
        );
        assert!(manager.resume(None).is_err());
    }
}
