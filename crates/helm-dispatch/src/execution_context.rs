//! Sequential token cursor for one dispatch call.
//!
//! A single forward-only cursor over the caller's whitespace-split tokens,
//! carried together with the call's environment. The cursor never rewinds.

use crate::environment::Environment;

/// Public struct `ExecutionContext` used across Helm components.
pub struct ExecutionContext<'tokens> {
    tokens: &'tokens [String],
    cursor: usize,
    environment: Environment,
}

impl<'tokens> ExecutionContext<'tokens> {
    pub fn new(environment: Environment, tokens: &'tokens [String]) -> Self {
        Self {
            tokens,
            cursor: 0,
            environment,
        }
    }

    /// Consumes and returns the next token.
    pub fn next_token(&mut self) -> Option<&'tokens str> {
        let token = self.tokens.get(self.cursor)?;
        self.cursor += 1;
        Some(token.as_str())
    }

    /// Returns the next token without consuming it.
    pub fn peek_token(&self) -> Option<&'tokens str> {
        self.tokens.get(self.cursor).map(String::as_str)
    }

    pub fn has_next(&self) -> bool {
        self.cursor < self.tokens.len()
    }

    pub fn remaining(&self) -> usize {
        self.tokens.len() - self.cursor
    }

    /// Consumes every remaining token, joined by single spaces.
    pub fn join_remaining(&mut self) -> String {
        let joined = self.tokens[self.cursor..].join(" ");
        self.cursor = self.tokens.len();
        joined
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.environment
    }
}
