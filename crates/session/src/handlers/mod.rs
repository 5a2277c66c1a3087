//! Built-in command handlers.
//!
//! | Names | Handler |
//! |-------|---------|
//! | `help`, `h` | [`HelpHandler`] |
//! | `quit`, `q`, `exit` | [`QuitHandler`] |
//! | `connect` | [`ConnectHandler`] |
//! | `cd`, `cn` | [`CdHandler`] |
//! | `ls` | [`LsHandler`] |
//! | `pwd`, `pwn` | [`PwdHandler`] |
//! | `history` | [`HistoryHandler`] |
//! | `read-attribute` | [`ReadAttributeHandler`] |
//! | `batch`, `discard-batch`, `list-batch`, `clear-batch`, `run-batch`, `holdback-batch` | batch control |
//! | `remove-batch-line`, `move-batch-line`, `edit-batch-line` | batch editing |

mod batch;
mod connect;
mod help;
mod history;
mod navigation;
mod quit;
mod read_attribute;

pub use batch::{
    BatchClearHandler, BatchDiscardHandler, BatchEditLineHandler, BatchHandler,
    BatchHoldbackHandler, BatchListHandler, BatchMoveLineHandler, BatchRemoveLineHandler,
    BatchRunHandler,
};
pub use connect::ConnectHandler;
pub use help::HelpHandler;
pub use history::HistoryHandler;
pub use navigation::{CdHandler, LsHandler, PwdHandler};
pub use quit::QuitHandler;
pub use read_attribute::ReadAttributeHandler;

use crate::registry::RegistryBuilder;

/// Add the standard command table to a builder.
pub fn register_builtins(builder: RegistryBuilder) -> RegistryBuilder {
    builder
        .register(HelpHandler, &["help", "h"])
        .register(QuitHandler, &["quit", "q", "exit"])
        .register(ConnectHandler, &["connect"])
        .register(CdHandler, &["cd", "cn"])
        .register(LsHandler, &["ls"])
        .register(PwdHandler, &["pwd", "pwn"])
        .register(HistoryHandler, &["history"])
        .register(ReadAttributeHandler, &["read-attribute"])
        .register(BatchHandler, &["batch"])
        .register(BatchDiscardHandler, &["discard-batch"])
        .register(BatchListHandler, &["list-batch"])
        .register(BatchHoldbackHandler, &["holdback-batch"])
        .register(BatchRunHandler, &["run-batch"])
        .register(BatchClearHandler, &["clear-batch"])
        .register(BatchRemoveLineHandler, &["remove-batch-line"])
        .register(BatchMoveLineHandler, &["move-batch-line"])
        .register(BatchEditLineHandler, &["edit-batch-line"])
}
