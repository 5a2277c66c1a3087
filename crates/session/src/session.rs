//! The console session and its dispatch loop.
//!
//! A [`Session`] owns everything a line can touch: the address context, the
//! batch manager, the connection to the controller, history, extensions and
//! the console sink. Every input line goes through [`Session::process_line`],
//! which classifies it and either navigates, executes, captures into the
//! active batch, or hands it to a registered command handler.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use mgmt_session::{CommandRegistry, InMemoryController, Session};
//!
//! let registry = Arc::new(CommandRegistry::builtin()?);
//! let mut session = Session::new(registry, Box::new(InMemoryController::standalone()));
//!
//! session.process_line("connect");
//! session.process_line("cd /subsystem=logging");
//! session.process_line(":read-attribute(name=level)");
//! ```

use std::sync::Arc;

use mgmt_core::{Address, AddressContext, OperationRequestParser, Request, Value};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::batch::{BatchManager, BatchedCommand};
use crate::classify::{classify, ClassifiedLine};
use crate::console::Console;
use crate::endpoint::{
    Connection, ConnectionInfo, Connector, ControllerAddress, ControllerMode, Interrupt,
};
use crate::error::{Error, Result};
use crate::extensions::Extensions;
use crate::format::{format_error, format_value, OutputMode};
use crate::handler::DispatchContext;
use crate::history::CommandHistory;
use crate::registry::CommandRegistry;

/// Message printed on interactive start while not connected.
pub const DISCONNECTED_HINT: &str = "You are disconnected at the moment. Type 'connect' to connect to the server or 'help' for the list of supported commands.";

struct LiveConnection {
    info: ConnectionInfo,
    /// Checked out by the dispatch thread while a call is in flight
    connection: Option<Box<dyn Connection>>,
    interrupt: Option<Interrupt>,
}

#[derive(Default)]
struct SlotState {
    live: Option<LiveConnection>,
    /// Bumped on every connect and disconnect
    generation: u64,
}

impl SlotState {
    fn take(&mut self) -> Option<LiveConnection> {
        let live = self.live.take()?;
        self.generation += 1;
        Some(live)
    }
}

type ConnectionSlot = Arc<Mutex<SlotState>>;

/// Closes the session's connection from another thread.
///
/// Used by termination hooks, which run outside the dispatch thread. The
/// slot lock is never held across an endpoint call, so closing does not wait
/// for a request in flight.
#[derive(Clone)]
pub struct ShutdownHandle {
    slot: ConnectionSlot,
}

impl ShutdownHandle {
    /// Close the connection if one is open. Returns the closed connection's
    /// descriptor.
    pub fn disconnect(&self) -> Option<ConnectionInfo> {
        let live = self.slot.lock().take()?;
        Some(close(live))
    }
}

impl std::fmt::Debug for ShutdownHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownHandle").finish_non_exhaustive()
    }
}

/// Close a connection taken out of the slot. A connection checked out by a
/// call in flight is interrupted instead; the caller closes it on return.
fn close(live: LiveConnection) -> ConnectionInfo {
    match live.connection {
        Some(mut connection) => connection.close(),
        None => {
            if let Some(interrupt) = &live.interrupt {
                interrupt();
            }
        }
    }
    info!(host = %live.info.host, port = live.info.port, "connection closed");
    live.info
}

/// A console session.
pub struct Session {
    registry: Arc<CommandRegistry>,
    connector: Box<dyn Connector>,
    connection: ConnectionSlot,
    default_controller: ControllerAddress,
    address: AddressContext,
    batches: BatchManager,
    history: CommandHistory,
    extensions: Extensions,
    console: Console,
    /// Cached connection part of the prompt, with the slot generation it
    /// was built for
    prompt_prefix: Option<(u64, String)>,
    terminated: bool,
}

impl Session {
    /// Create a disconnected session at the root, writing to standard output.
    pub fn new(registry: Arc<CommandRegistry>, connector: Box<dyn Connector>) -> Self {
        Self {
            registry,
            connector,
            connection: Arc::new(Mutex::new(SlotState::default())),
            default_controller: ControllerAddress::default(),
            address: AddressContext::new(),
            batches: BatchManager::new(),
            history: CommandHistory::new(),
            extensions: Extensions::new(),
            console: Console::stdout(),
            prompt_prefix: None,
            terminated: false,
        }
    }

    /// Replace the console sink.
    pub fn with_console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    /// Set the controller used when `connect` is given no host or port.
    pub fn with_default_controller(mut self, controller: ControllerAddress) -> Self {
        self.default_controller = controller;
        self
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Dispatch one line. Errors are printed, never returned. Returns true on
    /// success, false on error.
    pub fn process_line(&mut self, line: &str) -> bool {
        match self.dispatch(line) {
            Ok(()) => true,
            Err(err) => {
                debug!(line, error = %err, "line failed");
                let text = format_error(&err, self.console.mode());
                self.console.print_line(&text);
                false
            }
        }
    }

    /// Dispatch one line, returning the failure instead of printing it.
    pub fn dispatch(&mut self, line: &str) -> Result<()> {
        let classified = classify(line);
        if classified != ClassifiedLine::Empty {
            self.history.record(line.trim());
        }
        debug!(?classified, "dispatching line");

        match classified {
            ClassifiedLine::Empty => Ok(()),
            ClassifiedLine::Navigation(expr) => {
                let address = OperationRequestParser::parse_address(expr, &self.address)?;
                self.address.replace(address);
                Ok(())
            }
            ClassifiedLine::Operation(expr) => {
                if self.batches.is_active() {
                    let command = self.batched_operation(expr)?;
                    self.append_to_batch(command)
                } else {
                    let request = OperationRequestParser::parse_request(expr, &self.address)?;
                    let result = self.execute(&request)?;
                    self.print_value(&result);
                    Ok(())
                }
            }
            ClassifiedLine::Command { name, arguments } => {
                let ctx = DispatchContext::new(line.trim(), name, arguments);
                self.dispatch_command(&ctx)
            }
        }
    }

    fn dispatch_command(&mut self, ctx: &DispatchContext<'_>) -> Result<()> {
        let registry = Arc::clone(&self.registry);
        let registration = registry.lookup(ctx.command).ok_or_else(|| Error::UnknownCommand {
            line: ctx.line.to_string(),
        })?;
        let handler = registration.handler();

        if self.batches.is_active() {
            if !registration.batch_eligible() {
                return Err(Error::NotAllowedInBatch);
            }
            if handler.batch_mode() {
                let operation = handler.operation().ok_or(Error::NotAllowedInBatch)?;
                let request = operation
                    .build_request(self, ctx)
                    .map_err(|e| Error::handler(format!("Failed to add to batch: {}", e)))?;
                return self.append_to_batch(BatchedCommand::new(ctx.line, request));
            }
        }

        handler.handle(self, ctx)
    }

    fn batched_operation(&self, expr: &str) -> Result<BatchedCommand> {
        let parsed = OperationRequestParser::parse(expr, &self.address)?;
        let text = format!(
            "{}{}",
            parsed.address,
            parsed.operation_text().unwrap_or_default()
        );
        let request = parsed.into_request()?;
        Ok(BatchedCommand::new(text, request))
    }

    fn append_to_batch(&mut self, command: BatchedCommand) -> Result<()> {
        let text = command.text().to_string();
        let line = self.batches.active_mut()?.append(command);
        self.console.print_line(&format!("#{} {}", line, text));
        Ok(())
    }

    /// Turn a line into a batched command without executing or capturing it.
    ///
    /// Operation lines and commands with a request-building capability
    /// qualify; everything else is rejected.
    pub fn to_batched_command(&self, line: &str) -> Result<BatchedCommand> {
        match classify(line) {
            ClassifiedLine::Empty => Err(Error::invalid_arguments("The command line is empty.")),
            ClassifiedLine::Navigation(expr) | ClassifiedLine::Operation(expr) => {
                self.batched_operation(expr)
            }
            ClassifiedLine::Command { name, arguments } => {
                let ctx = DispatchContext::new(line.trim(), name, arguments);
                let registration =
                    self.registry
                        .lookup(name)
                        .ok_or_else(|| Error::UnknownCommand {
                            line: ctx.line.to_string(),
                        })?;
                if !registration.batch_eligible() {
                    return Err(Error::NotAllowedInBatch);
                }
                let operation = registration
                    .handler()
                    .operation()
                    .ok_or(Error::NotAllowedInBatch)?;
                let request = operation.build_request(self, &ctx)?;
                Ok(BatchedCommand::new(ctx.line, request))
            }
        }
    }

    /// Process lines until the session terminates or the lines run out, then
    /// terminate the session. Returns the number of lines that failed.
    pub fn run_script<I, S>(&mut self, lines: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut failed = 0;
        for line in lines {
            if self.terminated {
                break;
            }
            if !self.process_line(line.as_ref()) {
                failed += 1;
            }
        }
        self.terminate();
        failed
    }

    /// Stop the input loop after the current line.
    pub fn terminate(&mut self) {
        self.terminated = true;
    }

    /// Whether the session has been terminated.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    // =========================================================================
    // Connection management
    // =========================================================================

    /// Connect to a controller. Missing parts come from the default
    /// controller address.
    ///
    /// The new connection is probed with `read-children-types` on the root;
    /// an empty answer means the controller is not available, and a
    /// `server-group` child type means a domain controller. Any previous
    /// connection is closed once the new one is established. On failure the
    /// previous state is kept.
    pub fn connect(&mut self, host: Option<String>, port: Option<u16>) -> Result<()> {
        let target = self.default_controller.merge(host, port);
        debug!(host = %target.host, port = target.port, "connecting");

        let mut connection = self.connector.connect(&target.host, target.port)?;
        let probe = connection.execute(&Request::new(Address::root(), "read-children-types"));
        let types = match probe {
            Ok(value) => value.string_items(),
            Err(e) => {
                connection.close();
                return Err(e);
            }
        };
        if types.is_empty() {
            connection.close();
            return Err(Error::ControllerUnavailable {
                host: target.host,
                port: target.port,
            });
        }

        let info = ConnectionInfo {
            host: target.host,
            port: target.port,
            mode: ControllerMode::from_root_types(&types),
        };
        let interrupt = connection.interrupter();
        let previous = {
            let mut slot = self.connection.lock();
            let previous = slot.take();
            slot.live = Some(LiveConnection {
                info: info.clone(),
                connection: Some(connection),
                interrupt,
            });
            slot.generation += 1;
            previous
        };
        if let Some(previous) = previous {
            close(previous);
        }

        info!(host = %info.host, port = info.port, mode = %info.mode, "connected");
        self.console.print_line(&format!(
            "Connected to {} controller at {}:{}",
            info.mode, info.host, info.port
        ));
        Ok(())
    }

    /// Close the connection, printing a notice. Returns whether a connection
    /// was open.
    pub fn disconnect(&mut self) -> bool {
        match self.take_connection() {
            Some(info) => {
                self.console
                    .print_line(&format!("Closed connection to {}:{}", info.host, info.port));
                true
            }
            None => false,
        }
    }

    /// Close the connection without printing anything.
    pub fn disconnect_quietly(&mut self) -> bool {
        self.take_connection().is_some()
    }

    fn take_connection(&mut self) -> Option<ConnectionInfo> {
        let live = self.connection.lock().take();
        live.map(close)
    }

    /// Whether a connection is open.
    pub fn is_connected(&self) -> bool {
        self.connection.lock().live.is_some()
    }

    /// Descriptor of the open connection.
    pub fn connection_info(&self) -> Option<ConnectionInfo> {
        self.connection
            .lock()
            .live
            .as_ref()
            .map(|live| live.info.clone())
    }

    /// Handle for closing the connection from another thread.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            slot: Arc::clone(&self.connection),
        }
    }

    /// Controller used when `connect` is given no host or port.
    pub fn default_controller(&self) -> &ControllerAddress {
        &self.default_controller
    }

    /// Execute one request on the open connection.
    pub fn execute(&self, request: &Request) -> Result<Value> {
        debug!(%request, "executing");
        self.with_connection(|connection| connection.execute(request))
    }

    /// Execute requests as one composite operation on the open connection.
    pub fn execute_composite(&self, requests: &[Request]) -> Result<Value> {
        debug!(steps = requests.len(), "executing composite");
        self.with_connection(|connection| connection.execute_composite(requests))
    }

    /// Run `call` with the connection checked out of the slot, so that a
    /// [`ShutdownHandle`] can close it meanwhile. A connection closed during
    /// the call is released when the call returns.
    fn with_connection<T>(
        &self,
        call: impl FnOnce(&mut dyn Connection) -> Result<T>,
    ) -> Result<T> {
        let (generation, mut connection) = {
            let mut slot = self.connection.lock();
            let generation = slot.generation;
            let live = slot.live.as_mut().ok_or(Error::NotConnected)?;
            let connection = live.connection.take().ok_or(Error::NotConnected)?;
            (generation, connection)
        };

        let result = call(connection.as_mut());

        let orphaned = {
            let mut slot = self.connection.lock();
            let current = slot.generation;
            match slot.live.as_mut() {
                Some(live) if current == generation => {
                    live.connection = Some(connection);
                    None
                }
                _ => Some(connection),
            }
        };
        if let Some(mut connection) = orphaned {
            debug!("connection closed during call");
            connection.close();
        }
        result
    }

    // =========================================================================
    // Batches
    // =========================================================================

    /// Submit the active batch as one composite operation.
    ///
    /// On success the batch is dropped and batch mode ends. On failure the
    /// batch stays active and unchanged.
    pub fn run_batch(&mut self) -> Result<Value> {
        let requests = {
            let batch = self.batches.active().ok_or(Error::NoActiveBatch)?;
            if batch.is_empty() {
                return Err(Error::EmptyBatch);
            }
            batch.requests()
        };

        match self.execute_composite(&requests) {
            Ok(result) => {
                self.batches.discard()?;
                info!(steps = requests.len(), "batch executed");
                Ok(result)
            }
            Err(Error::OperationFailed { description }) => Err(Error::BatchFailed {
                reason: description,
            }),
            Err(e) => Err(e),
        }
    }

    /// The batch manager.
    pub fn batches(&self) -> &BatchManager {
        &self.batches
    }

    /// Mutable access to the batch manager.
    pub fn batches_mut(&mut self) -> &mut BatchManager {
        &mut self.batches
    }

    // =========================================================================
    // State accessors
    // =========================================================================

    /// The current address context.
    pub fn address(&self) -> &AddressContext {
        &self.address
    }

    /// Mutable access to the address context.
    pub fn address_mut(&mut self) -> &mut AddressContext {
        &mut self.address
    }

    /// The command registry.
    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// Command history.
    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    /// Mutable access to the command history.
    pub fn history_mut(&mut self) -> &mut CommandHistory {
        &mut self.history
    }

    /// Front-end extensions.
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Mutable access to the front-end extensions.
    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    // =========================================================================
    // Output
    // =========================================================================

    /// The console sink.
    pub fn console(&self) -> &Console {
        &self.console
    }

    /// Output mode of the console.
    pub fn output_mode(&self) -> OutputMode {
        self.console.mode()
    }

    /// Print one line.
    pub fn print_line(&mut self, text: &str) {
        self.console.print_line(text);
    }

    /// Print names in columns.
    pub fn print_columns(&mut self, items: &[String]) {
        self.console.print_columns(items);
    }

    /// Print an operation result in the console's output mode.
    pub fn print_value(&mut self, value: &Value) {
        let text = format_value(value, self.console.mode());
        if !text.is_empty() {
            self.console.print_line(&text);
        }
    }

    /// The prompt: `[<mode>@host:port <node>] ` or `[disconnected <node>] `,
    /// with ` #` before the closing bracket while a batch is active.
    pub fn prompt(&mut self) -> String {
        let (generation, info) = {
            let slot = self.connection.lock();
            (slot.generation, slot.live.as_ref().map(|live| live.info.clone()))
        };
        let prefix = match &self.prompt_prefix {
            Some((built_for, prefix)) if *built_for == generation => prefix.clone(),
            _ => {
                let prefix = match info {
                    Some(info) => format!("[{}@{}:{} ", info.mode, info.host, info.port),
                    None => "[disconnected ".to_string(),
                };
                self.prompt_prefix = Some((generation, prefix.clone()));
                prefix
            }
        };

        let mut prompt = prefix;
        prompt.push_str(&self.address.format());
        if self.batches.is_active() {
            prompt.push_str(" #");
        }
        prompt.push_str("] ");
        prompt
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.disconnect_quietly();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("address", &self.address.address().to_string())
            .field("connected", &self.is_connected())
            .field("batch_active", &self.batches.is_active())
            .field("terminated", &self.terminated)
            .finish_non_exhaustive()
    }
}
