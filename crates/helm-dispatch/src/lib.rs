//! Token-routing command dispatch.
//!
//! A line of whitespace-split tokens and an invoking actor are routed
//! through an immutable tree of command nodes: typed positional arguments
//! are parsed, subcommands recursed into, permissions gated at the terminal
//! hop, and a paginated usage listing produced wherever dispatch cannot
//! reach a handler. Completion mirrors the same walk token by token.

pub mod command_argument;
pub mod command_complete;
pub mod command_execute;
pub mod command_help;
pub mod command_node;
pub mod dispatch_error;
pub mod environment;
pub mod execution_context;

pub use command_argument::*;
pub use command_execute::{
    split_command_line, DISPATCH_FAILURE_MESSAGE, NO_PERMISSION_MESSAGE, PLAYER_ONLY_MESSAGE,
};
pub use command_help::{help_page_count, HELP_PAGE_SIZE};
pub use command_node::*;
pub use dispatch_error::*;
pub use environment::*;
pub use execution_context::*;
