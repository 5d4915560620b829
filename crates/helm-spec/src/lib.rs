//! Declarative command-tree wiring for the dispatch engine.
//!
//! Spec files describe command trees as data (names, aliases, permissions,
//! argument shapes, handler ids); an injected handler registry supplies the
//! behavior, and compilation produces the immutable nodes the engine
//! consumes. The engine itself never depends on this layer.

pub mod command_spec;
pub mod handler_registry;
pub mod spec_compile;

pub use command_spec::*;
pub use handler_registry::*;
pub use spec_compile::*;
