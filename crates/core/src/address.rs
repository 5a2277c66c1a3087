//! Node addresses and the navigable address context.
//!
//! An [`Address`] is an absolute path into the managed resource tree, made of
//! `type=name` steps. The empty address is the root. The last step may lack a
//! name, which denotes "all children of this type" and is only meaningful for
//! navigation and listing.
//!
//! [`AddressContext`] is the session's working directory. It is mutated only
//! by [`AddressContext::push`], [`AddressContext::pop`] and whole-address
//! replacement, so a failed navigation never leaves a half-applied path.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value::write_name;

/// One `type[=name]` step of an address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddressStep {
    /// Node type, e.g. `subsystem`
    #[serde(rename = "type")]
    pub node_type: String,
    /// Node name, e.g. `logging`; `None` for a type-only step
    #[serde(rename = "name", default, skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,
}

impl AddressStep {
    /// A fully named step.
    pub fn new(node_type: impl Into<String>, node_name: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            node_name: Some(node_name.into()),
        }
    }

    /// A step naming only the node type.
    pub fn node_type(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            node_name: None,
        }
    }

    /// Whether this step names a concrete node.
    pub fn is_named(&self) -> bool {
        self.node_name.is_some()
    }
}

impl fmt::Display for AddressStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_name(f, &self.node_type)?;
        if let Some(name) = &self.node_name {
            f.write_str("=")?;
            write_name(f, name)?;
        }
        Ok(())
    }
}

/// An absolute address snapshot. Empty means the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address {
    steps: Vec<AddressStep>,
}

impl Address {
    /// The root address.
    pub fn root() -> Self {
        Self::default()
    }

    /// Build an address from `(type, name)` pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            steps: pairs
                .into_iter()
                .map(|(node_type, node_name)| AddressStep::new(node_type, node_name))
                .collect(),
        }
    }

    /// Whether this is the root address.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// All steps, root first.
    pub fn steps(&self) -> &[AddressStep] {
        &self.steps
    }

    /// The last step, if any.
    pub fn last(&self) -> Option<&AddressStep> {
        self.steps.last()
    }

    /// Append a step.
    pub fn push(&mut self, step: AddressStep) {
        self.steps.push(step);
    }

    /// Remove and return the last step.
    pub fn pop(&mut self) -> Option<AddressStep> {
        self.steps.pop()
    }

    /// Give the trailing type-only step a name. Returns false when the address
    /// does not end with a type-only step.
    pub fn name_last(&mut self, node_name: impl Into<String>) -> bool {
        match self.steps.last_mut() {
            Some(step) if step.node_name.is_none() => {
                step.node_name = Some(node_name.into());
                true
            }
            _ => false,
        }
    }

    /// Drop the name of the last step, keeping its type.
    pub fn strip_last_name(&mut self) -> bool {
        match self.steps.last_mut() {
            Some(step) => {
                step.node_name = None;
                true
            }
            None => false,
        }
    }

    /// Whether every step carries a node name.
    pub fn is_complete(&self) -> bool {
        self.steps.iter().all(AddressStep::is_named)
    }

    /// The address without its last step.
    pub fn parent(&self) -> Address {
        let mut parent = self.clone();
        parent.pop();
        parent
    }
}

/// Absolute form: `/` for the root, otherwise `/a=b/c=d`.
impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return f.write_str("/");
        }
        for step in &self.steps {
            write!(f, "/{}", step)?;
        }
        Ok(())
    }
}

/// The session's current position in the resource tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressContext {
    current: Address,
}

impl AddressContext {
    /// A context positioned at the root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the context is at the root.
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Node type of the last step.
    pub fn node_type(&self) -> Option<&str> {
        self.current.last().map(|step| step.node_type.as_str())
    }

    /// Node name of the last step.
    pub fn node_name(&self) -> Option<&str> {
        self.current.last().and_then(|step| step.node_name.as_deref())
    }

    /// Navigate one step down.
    pub fn push(&mut self, step: AddressStep) {
        self.current.push(step);
    }

    /// Navigate one step up. At the root this does nothing and returns `None`.
    pub fn pop(&mut self) -> Option<AddressStep> {
        self.current.pop()
    }

    /// Prompt form: `/` at the root, otherwise `type[=name]` of the last step.
    pub fn format(&self) -> String {
        match self.current.last() {
            None => "/".to_string(),
            Some(step) => step.to_string(),
        }
    }

    /// The current address.
    pub fn address(&self) -> &Address {
        &self.current
    }

    /// Copy of the current address.
    pub fn snapshot(&self) -> Address {
        self.current.clone()
    }

    /// Replace the whole address in one step.
    pub fn replace(&mut self, address: Address) {
        self.current = address;
    }

    /// Return to the root.
    pub fn reset(&mut self) {
        self.current = Address::root();
    }
}
