//! Resolved management requests.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::address::Address;
use crate::value::{write_name, Value};

/// One management operation against an absolute address.
///
/// Requests are transient: they are built from a parsed expression (or by an
/// operation command), handed to the endpoint or stored in a batch, and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Target node, snapshotted at build time
    pub address: Address,
    /// Operation name, e.g. `read-resource`
    pub operation: String,
    /// Named parameters
    #[serde(default)]
    pub parameters: BTreeMap<String, Value>,
}

impl Request {
    /// Create a request with no parameters.
    pub fn new(address: Address, operation: impl Into<String>) -> Self {
        Self {
            address,
            operation: operation.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Add a parameter, replacing any previous value under the same name.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Look up a parameter.
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }
}

/// Canonical expression form, e.g. `/subsystem=logging:write-attribute(name=level,value=INFO)`.
///
/// The root address renders as `/`, so a root operation reads `/:read-resource`.
impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.address)?;
        write_name(f, &self.operation)?;
        if self.parameters.is_empty() {
            return Ok(());
        }
        f.write_str("(")?;
        for (i, (name, value)) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write_name(f, name)?;
            write!(f, "={}", value)?;
        }
        f.write_str(")")
    }
}
