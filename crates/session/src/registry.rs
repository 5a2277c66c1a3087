//! Command registry.
//!
//! The registry is assembled once with a [`RegistryBuilder`] and is immutable
//! afterwards; sessions share it through an `Arc`. Lookup is case-insensitive.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::handler::Handler;
use crate::handlers;

/// A handler together with its aliases and batch eligibility.
pub struct Registration {
    handler: Box<dyn Handler>,
    batch_eligible: bool,
    names: Vec<String>,
}

impl Registration {
    /// The registered handler.
    pub fn handler(&self) -> &dyn Handler {
        self.handler.as_ref()
    }

    /// Whether the registration allows capture into a batch at all.
    ///
    /// `false` makes the command fail while a batch is active, whatever the
    /// handler itself declares.
    pub fn batch_eligible(&self) -> bool {
        self.batch_eligible
    }

    /// All aliases, primary name first.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The primary name.
    pub fn name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or("")
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("names", &self.names)
            .field("batch_eligible", &self.batch_eligible)
            .finish()
    }
}

/// Immutable table of command handlers.
#[derive(Debug)]
pub struct CommandRegistry {
    registrations: Vec<Registration>,
    index: HashMap<String, usize>,
}

impl CommandRegistry {
    /// Start building a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Registry holding the standard command table.
    pub fn builtin() -> Result<Self> {
        Self::builder().builtins().build()
    }

    /// Find the registration for a command name, ignoring case.
    pub fn lookup(&self, name: &str) -> Option<&Registration> {
        self.index
            .get(&name.to_lowercase())
            .map(|&i| &self.registrations[i])
    }

    /// Every alias, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.index.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Registrations in registration order.
    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }
}

/// Collects registrations and checks alias uniqueness on [`build`](Self::build).
#[derive(Default)]
pub struct RegistryBuilder {
    registrations: Vec<Registration>,
}

impl RegistryBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a batch-eligible handler under `names`.
    pub fn register(self, handler: impl Handler + 'static, names: &[&str]) -> Self {
        self.register_with(handler, true, names)
    }

    /// Register a handler with an explicit batch eligibility.
    pub fn register_with(
        mut self,
        handler: impl Handler + 'static,
        batch_eligible: bool,
        names: &[&str],
    ) -> Self {
        self.registrations.push(Registration {
            handler: Box::new(handler),
            batch_eligible,
            names: names.iter().map(|n| n.to_lowercase()).collect(),
        });
        self
    }

    /// Add the standard command table.
    pub fn builtins(self) -> Self {
        handlers::register_builtins(self)
    }

    /// Freeze the registry. Fails when an alias is registered twice or a
    /// registration has no names.
    pub fn build(self) -> Result<CommandRegistry> {
        let mut index = HashMap::new();
        for (i, registration) in self.registrations.iter().enumerate() {
            if registration.names.is_empty() {
                return Err(Error::invalid_arguments(
                    "a command must be registered under at least one name",
                ));
            }
            for name in &registration.names {
                if index.insert(name.clone(), i).is_some() {
                    return Err(Error::DuplicateCommand { name: name.clone() });
                }
            }
        }
        Ok(CommandRegistry {
            registrations: self.registrations,
            index,
        })
    }
}
