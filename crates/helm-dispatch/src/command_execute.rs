//! The token-consuming dispatch walk.
//!
//! `execute` is the single outer boundary: contained failures inside the
//! walk surface as one logged warning plus one generic message to the
//! invoker, never a propagated error or a stack trace. Every inner layer
//! either fully handles a condition (specific message, `false` return) or
//! lets it propagate unmodified.

use std::sync::Arc;

use helm_access::Invoker;

use crate::command_argument::{ArgumentSpec, ParseOutcome};
use crate::command_node::{CommandNode, HELP_COMMAND_NAME};
use crate::dispatch_error::DispatchError;
use crate::environment::Environment;
use crate::execution_context::ExecutionContext;

pub const PLAYER_ONLY_MESSAGE: &str = "this command is only available to players";
pub const NO_PERMISSION_MESSAGE: &str = "you do not have permission to run this command";
pub const DISPATCH_FAILURE_MESSAGE: &str = "something went wrong while running this command";

/// Name of the optional integer argument of the synthesized help listing.
const HELP_PAGE_ARGUMENT: &str = "page";

enum ChildRoute<'tree> {
    Child(&'tree CommandNode),
    BuiltinHelp,
}

impl CommandNode {
    /// Routes `tokens` through this node and its descendants. Returns true
    /// when a handler ran (here or deeper); any contained failure has
    /// already produced a user-visible message by the time this returns.
    pub fn execute(&self, invoker: Arc<dyn Invoker>, tokens: &[String]) -> bool {
        let environment = Environment::new(Arc::clone(&invoker));
        let mut context = ExecutionContext::new(environment, tokens);
        match self.execute_inner(&mut context) {
            Ok(handled) => handled,
            Err(error) => {
                tracing::warn!(command = %self.name, error = %error, "command dispatch failed");
                invoker.send_message(DISPATCH_FAILURE_MESSAGE);
                false
            }
        }
    }

    fn execute_inner(&self, context: &mut ExecutionContext<'_>) -> Result<bool, DispatchError> {
        if self.player_only && !context.environment().invoker().is_player() {
            context.environment().invoker().send_message(PLAYER_ONLY_MESSAGE);
            return Ok(false);
        }
        for precondition in &self.preconditions {
            if !(precondition.check)(context.environment()) {
                if let Some(message) = &precondition.failure_message {
                    context.environment().invoker().send_message(message);
                }
                return Ok(false);
            }
        }
        if context.remaining() < self.mandatory.len() {
            self.show_help_first_page(context.environment().invoker());
            return Ok(false);
        }

        let mut consumed_greedy = false;
        for argument in &self.mandatory {
            if argument.is_greedy() {
                let joined = context.join_remaining();
                if !self.bind_argument(argument, &joined, context)? {
                    return Ok(false);
                }
                consumed_greedy = true;
                break;
            }
            let Some(token) = context.next_token() else {
                self.show_help_first_page(context.environment().invoker());
                return Ok(false);
            };
            if !self.bind_argument(argument, token, context)? {
                return Ok(false);
            }
        }

        if !consumed_greedy {
            // A token naming a child dispatches before any optional
            // argument gets a chance to claim it.
            if let Some(route) = self.peek_route(context) {
                context.next_token();
                return self.follow_route(route, context);
            }

            for argument in self.optional_arguments() {
                if argument.is_greedy() {
                    if context.has_next() {
                        let joined = context.join_remaining();
                        if !self.bind_argument(argument, &joined, context)? {
                            return Ok(false);
                        }
                    } else {
                        self.bind_default(argument, context);
                    }
                    break;
                }
                match context.next_token() {
                    Some(token) => {
                        if !self.bind_argument(argument, token, context)? {
                            return Ok(false);
                        }
                    }
                    None => self.bind_default(argument, context),
                }
            }
        }

        if context.has_next() {
            match self.peek_route(context) {
                Some(route) => {
                    context.next_token();
                    return self.follow_route(route, context);
                }
                None => {
                    // Unrecognized trailing input.
                    self.show_help_first_page(context.environment().invoker());
                    return Ok(false);
                }
            }
        }

        if let Some(permission) = &self.permission {
            if !permission.allows(context.environment().invoker()) {
                context.environment().invoker().send_message(NO_PERMISSION_MESSAGE);
                return Ok(false);
            }
        }

        self.run_side_values(context);
        match &self.handler {
            Some(handler) => {
                handler(context.environment_mut(), self).map_err(|reason| {
                    DispatchError::HandlerFailed {
                        command: self.name.clone(),
                        reason,
                    }
                })?;
                Ok(true)
            }
            None => {
                self.show_help_first_page(context.environment().invoker());
                Ok(false)
            }
        }
    }

    fn peek_route(&self, context: &ExecutionContext<'_>) -> Option<ChildRoute<'_>> {
        let token = context.peek_token()?;
        if let Some(child) = self.find_child(token) {
            return Some(ChildRoute::Child(child));
        }
        if token == HELP_COMMAND_NAME && self.builtin_help_enabled() {
            return Some(ChildRoute::BuiltinHelp);
        }
        None
    }

    fn follow_route(
        &self,
        route: ChildRoute<'_>,
        context: &mut ExecutionContext<'_>,
    ) -> Result<bool, DispatchError> {
        self.run_side_values(context);
        match route {
            ChildRoute::Child(child) => child.execute_inner(context),
            ChildRoute::BuiltinHelp => self.execute_builtin_help(context),
        }
    }

    /// Parses one token for `argument`. True means bound; false means the
    /// failure was already reported through a configured message.
    fn bind_argument(
        &self,
        argument: &ArgumentSpec,
        token: &str,
        context: &mut ExecutionContext<'_>,
    ) -> Result<bool, DispatchError> {
        match argument.parse_into(token, context.environment()) {
            Ok(ParseOutcome::Bound(parsed)) => {
                context.environment_mut().set_argument(parsed);
                Ok(true)
            }
            Ok(ParseOutcome::Recovered) => Ok(false),
            Err(failure) => Err(DispatchError::ArgumentParse {
                argument: argument.name().to_string(),
                token: token.to_string(),
                failure,
            }),
        }
    }

    /// Binds an absent optional argument's default; without one the
    /// argument simply stays unbound.
    fn bind_default(&self, argument: &ArgumentSpec, context: &mut ExecutionContext<'_>) {
        if let Some(bound) = argument.default_value(context.environment()) {
            context.environment_mut().set_argument(bound);
        }
    }

    fn run_side_values(&self, context: &mut ExecutionContext<'_>) {
        for (name, supplier) in &self.side_values {
            let value = supplier(context.environment());
            context.environment_mut().set(name.clone(), value);
        }
    }

    /// The synthesized `help` child: one optional integer `page` argument
    /// defaulting to 1; out-of-range pages fall back to the first page.
    fn execute_builtin_help(
        &self,
        context: &mut ExecutionContext<'_>,
    ) -> Result<bool, DispatchError> {
        let page = match context.next_token() {
            Some(token) => {
                let page_argument = ArgumentSpec::integer(HELP_PAGE_ARGUMENT);
                match page_argument.parse_into(token, context.environment()) {
                    Ok(ParseOutcome::Bound(parsed)) => {
                        let page = parsed.value.as_i64().unwrap_or(1);
                        context.environment_mut().set_argument(parsed);
                        page
                    }
                    Ok(ParseOutcome::Recovered) => return Ok(false),
                    Err(failure) => {
                        return Err(DispatchError::ArgumentParse {
                            argument: HELP_PAGE_ARGUMENT.to_string(),
                            token: token.to_string(),
                            failure,
                        })
                    }
                }
            }
            None => 1,
        };
        let page_index = usize::try_from(page.saturating_sub(1)).unwrap_or(0);
        self.send_help_page_or_first(context.environment().invoker(), page_index);
        Ok(true)
    }
}

/// Splits one raw line into whitespace-separated tokens the way hosts are
/// expected to before calling `execute`/`complete`.
pub fn split_command_line(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}
