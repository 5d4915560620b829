//! Per-invocation key/value store threaded through one dispatch call.
//!
//! Exactly one environment exists per external `execute`/`complete` call;
//! it is mutated in place as arguments are parsed and side values injected.
//! Plain values take precedence over parsed-argument wrappers on lookup.

use std::collections::BTreeMap;
use std::sync::Arc;

use helm_access::Invoker;
use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A parsed argument: the raw token alongside its typed value.
pub struct ParsedArgument {
    pub name: String,
    pub raw: String,
    pub value: Value,
}

/// Public struct `Environment` used across Helm components.
pub struct Environment {
    invoker: Arc<dyn Invoker>,
    values: BTreeMap<String, Value>,
    arguments: BTreeMap<String, ParsedArgument>,
}

impl Environment {
    pub fn new(invoker: Arc<dyn Invoker>) -> Self {
        Self {
            invoker,
            values: BTreeMap::new(),
            arguments: BTreeMap::new(),
        }
    }

    pub fn invoker(&self) -> &dyn Invoker {
        self.invoker.as_ref()
    }

    /// Reads `key` as a `T`, preferring plain values and falling back to
    /// the unwrapped value of a parsed argument. A type mismatch is a
    /// caller error and reads as `None`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.value(key)?;
        serde_json::from_value(value.clone()).ok()
    }

    /// The raw stored value for `key`, if any.
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values
            .get(key)
            .or_else(|| self.arguments.get(key).map(|argument| &argument.value))
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    /// The full argument wrapper for `key` (raw token plus typed value).
    pub fn argument(&self, key: &str) -> Option<&ParsedArgument> {
        self.arguments.get(key)
    }

    pub fn set_argument(&mut self, argument: ParsedArgument) {
        self.arguments.insert(argument.name.clone(), argument);
    }
}
