//! In-memory management controller.
//!
//! A resource tree that answers the generic management operations. It backs
//! the test suites and is handy for trying the console without a server:
//!
//! | Operation | Parameters | Result |
//! |-----------|------------|--------|
//! | `read-children-types` | | child type names |
//! | `read-children-names` | `child-type` | child names of that type |
//! | `read-resource` | | attributes plus `type => {name => undefined}` per child |
//! | `read-attribute` | `name` | attribute value |
//! | `write-attribute` | `name`, `value` | undefined |
//! | `add` | any | undefined; parameters become attributes |
//! | `remove` | | undefined |
//!
//! Composites are all-or-nothing: steps run against a copy of the tree, which
//! replaces the live tree only when every step succeeded.
//!
//! Every handle created by `clone` shares the same tree and recorders.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use mgmt_core::{Address, Request, Value};
use parking_lot::Mutex;
use tracing::debug;

use crate::endpoint::{Connection, Connector};
use crate::error::{Error, Result};

/// One node of the resource tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceNode {
    /// Attribute values
    pub attributes: BTreeMap<String, Value>,
    /// Children by type, then by name
    pub children: BTreeMap<String, BTreeMap<String, ResourceNode>>,
}

impl ResourceNode {
    fn find(&self, address: &Address) -> Option<&ResourceNode> {
        let mut node = self;
        for step in address.steps() {
            let name = step.node_name.as_deref()?;
            node = node.children.get(&step.node_type)?.get(name)?;
        }
        Some(node)
    }

    fn find_mut(&mut self, address: &Address) -> Option<&mut ResourceNode> {
        let mut node = self;
        for step in address.steps() {
            let name = step.node_name.as_deref()?;
            node = node.children.get_mut(&step.node_type)?.get_mut(name)?;
        }
        Some(node)
    }

    fn to_value(&self) -> Value {
        let mut map = self.attributes.clone();
        for (child_type, children) in &self.children {
            let names = children
                .keys()
                .map(|name| (name.clone(), Value::Null))
                .collect();
            map.insert(child_type.clone(), Value::Object(names));
        }
        Value::Object(map)
    }
}

#[derive(Debug, Default)]
struct ControllerState {
    root: ResourceNode,
    connects: Vec<(String, u16)>,
    requests: Vec<Request>,
    composites: Vec<Vec<Request>>,
    failing: BTreeMap<String, String>,
    unknown_hosts: BTreeSet<String>,
    unreachable: bool,
    open_connections: usize,
}

/// Shareable in-memory controller; also its own [`Connector`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryController {
    state: Arc<Mutex<ControllerState>>,
}

impl InMemoryController {
    /// An empty tree. A controller whose root has no children reports itself
    /// unavailable when probed.
    pub fn new() -> Self {
        Self::default()
    }

    /// A small standalone server tree with logging and datasources subsystems.
    pub fn standalone() -> Self {
        let controller = Self::new();
        controller.add_node(
            &Address::from_pairs([("subsystem", "logging")]),
            [("level", Value::from("INFO"))],
        );
        controller.add_node(
            &Address::from_pairs([("subsystem", "logging"), ("logger", "root")]),
            [("level", Value::from("INFO"))],
        );
        controller.add_node(
            &Address::from_pairs([("subsystem", "logging"), ("console-handler", "CONSOLE")]),
            [("level", Value::from("INFO"))],
        );
        controller.add_node(
            &Address::from_pairs([("subsystem", "datasources")]),
            [] as [(&str, Value); 0],
        );
        controller.add_node(
            &Address::from_pairs([("interface", "public")]),
            [("inet-address", Value::from("127.0.0.1"))],
        );
        controller
    }

    /// A domain controller tree: the standalone tree plus server groups.
    pub fn domain() -> Self {
        let controller = Self::standalone();
        controller.add_node(
            &Address::from_pairs([("server-group", "main-server-group")]),
            [("profile", Value::from("default"))],
        );
        controller
    }

    /// Create a node, and any missing ancestors, with the given attributes.
    pub fn add_node<'a>(
        &self,
        address: &Address,
        attributes: impl IntoIterator<Item = (&'a str, Value)>,
    ) {
        let mut state = self.state.lock();
        let mut node = &mut state.root;
        for step in address.steps() {
            let name = step.node_name.clone().unwrap_or_default();
            node = node
                .children
                .entry(step.node_type.clone())
                .or_default()
                .entry(name)
                .or_default();
        }
        for (name, value) in attributes {
            node.attributes.insert(name.to_string(), value);
        }
    }

    /// Snapshot of the node at `address`.
    pub fn node(&self, address: &Address) -> Option<ResourceNode> {
        self.state.lock().root.find(address).cloned()
    }

    /// Make every request for `operation` fail with `description`.
    pub fn fail_operation(&self, operation: &str, description: &str) {
        self.state
            .lock()
            .failing
            .insert(operation.to_string(), description.to_string());
    }

    /// Make connections to `host` fail name resolution.
    pub fn add_unknown_host(&self, host: &str) {
        self.state.lock().unknown_hosts.insert(host.to_string());
    }

    /// Make every connection attempt fail as unreachable.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.lock().unreachable = unreachable;
    }

    /// Every `(host, port)` a connection was attempted to.
    pub fn connects(&self) -> Vec<(String, u16)> {
        self.state.lock().connects.clone()
    }

    /// Every single request executed, in order.
    pub fn requests(&self) -> Vec<Request> {
        self.state.lock().requests.clone()
    }

    /// Every composite submitted, in order.
    pub fn composites(&self) -> Vec<Vec<Request>> {
        self.state.lock().composites.clone()
    }

    /// Connections opened and not yet closed.
    pub fn open_connections(&self) -> usize {
        self.state.lock().open_connections
    }
}

impl Connector for InMemoryController {
    fn connect(&self, host: &str, port: u16) -> Result<Box<dyn Connection>> {
        let mut state = self.state.lock();
        state.connects.push((host.to_string(), port));
        if state.unknown_hosts.contains(host) {
            return Err(Error::UnknownHost {
                host: host.to_string(),
                reason: "Name or service not known".to_string(),
            });
        }
        if state.unreachable {
            return Err(Error::Unreachable {
                host: host.to_string(),
                port,
                reason: "Connection refused".to_string(),
            });
        }
        state.open_connections += 1;
        debug!(host, port, "in-memory connection opened");
        Ok(Box::new(InMemoryConnection {
            state: Arc::clone(&self.state),
            closed: false,
        }))
    }
}

struct InMemoryConnection {
    state: Arc<Mutex<ControllerState>>,
    closed: bool,
}

impl Connection for InMemoryConnection {
    fn execute(&mut self, request: &Request) -> Result<Value> {
        let mut state = self.state.lock();
        state.requests.push(request.clone());
        check_injected(&state.failing, request)?;
        apply(&mut state.root, request)
    }

    fn execute_composite(&mut self, requests: &[Request]) -> Result<Value> {
        let mut state = self.state.lock();
        state.composites.push(requests.to_vec());

        let mut scratch = state.root.clone();
        let mut results = BTreeMap::new();
        for (i, request) in requests.iter().enumerate() {
            let step = format!("step-{}", i + 1);
            let outcome =
                check_injected(&state.failing, request).and_then(|_| apply(&mut scratch, request));
            match outcome {
                Ok(value) => {
                    results.insert(step, value);
                }
                Err(Error::OperationFailed { description }) => {
                    return Err(Error::OperationFailed {
                        description: format!("Operation {} failed: {}", step, description),
                    });
                }
                Err(e) => return Err(e),
            }
        }
        state.root = scratch;
        Ok(Value::Object(results))
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            let mut state = self.state.lock();
            state.open_connections = state.open_connections.saturating_sub(1);
        }
    }
}

fn failed(description: impl Into<String>) -> Error {
    Error::OperationFailed {
        description: description.into(),
    }
}

fn check_injected(failing: &BTreeMap<String, String>, request: &Request) -> Result<()> {
    match failing.get(&request.operation) {
        Some(description) => Err(failed(description.clone())),
        None => Ok(()),
    }
}

fn not_found(address: &Address) -> Error {
    failed(format!("Management resource '{}' not found", address))
}

fn required_string<'a>(request: &'a Request, name: &str) -> Result<&'a str> {
    request
        .param(name)
        .and_then(Value::as_str)
        .ok_or_else(|| failed(format!("Required parameter '{}' is missing", name)))
}

fn apply(root: &mut ResourceNode, request: &Request) -> Result<Value> {
    let address = &request.address;
    match request.operation.as_str() {
        "read-children-types" => {
            let node = root.find(address).ok_or_else(|| not_found(address))?;
            Ok(Value::List(
                node.children.keys().map(|t| Value::from(t.as_str())).collect(),
            ))
        }
        "read-children-names" => {
            let child_type = required_string(request, "child-type")?;
            let node = root.find(address).ok_or_else(|| not_found(address))?;
            let names = node
                .children
                .get(child_type)
                .map(|children| children.keys().map(|n| Value::from(n.as_str())).collect())
                .unwrap_or_default();
            Ok(Value::List(names))
        }
        "read-resource" => {
            let node = root.find(address).ok_or_else(|| not_found(address))?;
            Ok(node.to_value())
        }
        "read-attribute" => {
            let name = required_string(request, "name")?;
            let node = root.find(address).ok_or_else(|| not_found(address))?;
            node.attributes
                .get(name)
                .cloned()
                .ok_or_else(|| failed(format!("Unknown attribute '{}'", name)))
        }
        "write-attribute" => {
            let name = required_string(request, "name")?.to_string();
            let value = request.param("value").cloned().unwrap_or(Value::Null);
            let node = root.find_mut(address).ok_or_else(|| not_found(address))?;
            node.attributes.insert(name, value);
            Ok(Value::Null)
        }
        "add" => {
            let Some(last) = address.last() else {
                return Err(failed("Cannot add the root resource"));
            };
            let Some(name) = last.node_name.clone() else {
                return Err(failed("Node name not specified"));
            };
            if root.find(address).is_some() {
                return Err(failed(format!("Duplicate resource '{}'", address)));
            }
            let parent = root
                .find_mut(&address.parent())
                .ok_or_else(|| not_found(&address.parent()))?;
            let node = ResourceNode {
                attributes: request.parameters.clone(),
                children: BTreeMap::new(),
            };
            parent
                .children
                .entry(last.node_type.clone())
                .or_default()
                .insert(name, node);
            Ok(Value::Null)
        }
        "remove" => {
            let Some(last) = address.last() else {
                return Err(failed("Cannot remove the root resource"));
            };
            let name = last.node_name.as_deref().unwrap_or_default();
            let parent = root
                .find_mut(&address.parent())
                .ok_or_else(|| not_found(address))?;
            let children = parent
                .children
                .get_mut(&last.node_type)
                .ok_or_else(|| not_found(address))?;
            if children.remove(name).is_none() {
                return Err(not_found(address));
            }
            if children.is_empty() {
                parent.children.remove(&last.node_type);
            }
            Ok(Value::Null)
        }
        other => Err(failed(format!("No operation named '{}' exists", other))),
    }
}
