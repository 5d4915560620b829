//! Actor capabilities and hierarchical permissions for command dispatch.
//!
//! Hosts the `Invoker` capability trait (message delivery, operator flag,
//! explicit permission settings) and the process-wide pooled `Permission`
//! hierarchy consulted by the dispatch engine.

pub mod invoker;
pub mod permission;

pub use invoker::*;
pub use permission::*;
