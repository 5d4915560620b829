//! Explicit handler registry injected into spec compilation.
//!
//! Spec files reference behavior by handler id; the host registers the
//! closures up front and passes the registry into compilation. Nothing here
//! is process-global: two trees can be compiled against two registries.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use anyhow::{bail, Result};
use helm_dispatch::{CommandHandler, CommandNode, Environment};

#[derive(Default, Clone)]
/// Public struct `HandlerRegistry` used across Helm components.
pub struct HandlerRegistry {
    handlers: BTreeMap<String, CommandHandler>,
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("ids", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `id`; duplicate ids are a wiring error.
    pub fn register(&mut self, id: impl Into<String>, handler: CommandHandler) -> Result<()> {
        let id = id.into();
        if self.handlers.contains_key(&id) {
            bail!("handler id `{id}` is already registered");
        }
        self.handlers.insert(id, handler);
        Ok(())
    }

    /// Closure-friendly variant of `register`.
    pub fn register_fn<F>(&mut self, id: impl Into<String>, handler: F) -> Result<()>
    where
        F: Fn(&mut Environment, &CommandNode) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.register(id, Arc::new(handler))
    }

    pub fn get(&self, id: &str) -> Option<CommandHandler> {
        self.handlers.get(id).cloned()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}
