//! The command tree: immutable nodes built through a fail-fast builder.
//!
//! A node's body is exactly one of two shapes: a leaf with positional
//! optional arguments, or a branch with named children. Both compete for
//! the same trailing tokens, so the combination is unrepresentable rather
//! than checked at dispatch time. Trees are built once and read-only
//! thereafter.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

use helm_access::Permission;
use serde_json::Value;

use crate::command_argument::ArgumentSpec;
use crate::dispatch_error::TreeBuildError;
use crate::environment::Environment;

/// Name reserved for the synthesized help listing on every node.
pub const HELP_COMMAND_NAME: &str = "help";

pub type CommandHandler =
    Arc<dyn Fn(&mut Environment, &CommandNode) -> anyhow::Result<()> + Send + Sync>;
pub type PreconditionCheck = Arc<dyn Fn(&Environment) -> bool + Send + Sync>;
pub type SideValueSupplier = Arc<dyn Fn(&Environment) -> Value + Send + Sync>;

/// A gate evaluated before argument parsing; the first failing gate sends
/// its message (if any) and stops dispatch.
pub(crate) struct Precondition {
    pub(crate) check: PreconditionCheck,
    pub(crate) failure_message: Option<String>,
}

pub(crate) enum CommandNodeBody {
    Leaf {
        optional: Vec<ArgumentSpec>,
    },
    Branch {
        children: Vec<CommandNode>,
        names: BTreeMap<String, usize>,
        aliases: BTreeMap<String, usize>,
    },
}

/// Public struct `CommandNode` used across Helm components.
pub struct CommandNode {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) permission: Option<Arc<Permission>>,
    pub(crate) player_only: bool,
    pub(crate) aliases: Vec<String>,
    pub(crate) mandatory: Vec<ArgumentSpec>,
    pub(crate) preconditions: Vec<Precondition>,
    pub(crate) side_values: Vec<(String, SideValueSupplier)>,
    pub(crate) handler: Option<CommandHandler>,
    pub(crate) body: CommandNodeBody,
}

impl fmt::Debug for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandNode")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("mandatory", &self.mandatory.len())
            .field("children", &self.children().len())
            .finish_non_exhaustive()
    }
}

impl CommandNode {
    pub fn builder(name: impl Into<String>) -> CommandNodeBuilder {
        CommandNodeBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn permission(&self) -> Option<&Arc<Permission>> {
        self.permission.as_ref()
    }

    pub fn is_player_only(&self) -> bool {
        self.player_only
    }

    pub fn mandatory_arguments(&self) -> &[ArgumentSpec] {
        &self.mandatory
    }

    pub fn optional_arguments(&self) -> &[ArgumentSpec] {
        match &self.body {
            CommandNodeBody::Leaf { optional } => optional,
            CommandNodeBody::Branch { .. } => &[],
        }
    }

    /// Children in registration order (empty for leaves).
    pub fn children(&self) -> &[CommandNode] {
        match &self.body {
            CommandNodeBody::Branch { children, .. } => children,
            CommandNodeBody::Leaf { .. } => &[],
        }
    }

    /// Looks `name` up as a child, checking primary names before aliases.
    pub fn find_child(&self, name: &str) -> Option<&CommandNode> {
        match &self.body {
            CommandNodeBody::Branch {
                children,
                names,
                aliases,
            } => {
                let index = names.get(name).or_else(|| aliases.get(name))?;
                children.get(*index)
            }
            CommandNodeBody::Leaf { .. } => None,
        }
    }

    /// Whether the synthesized `help` listing answers on this node: every
    /// node gets one unless it is itself named `help` or declares its own
    /// `help` child.
    pub fn builtin_help_enabled(&self) -> bool {
        self.name != HELP_COMMAND_NAME && self.find_child(HELP_COMMAND_NAME).is_none()
    }

    /// The argument definition responsible for positional `position`, with
    /// mandatory slots before optional ones. A greedy trailing argument
    /// owns every later position.
    pub(crate) fn argument_at(&self, position: usize) -> Option<&ArgumentSpec> {
        if let Some(argument) = self.mandatory.get(position) {
            return Some(argument);
        }
        if let Some(last) = self.mandatory.last() {
            if last.is_greedy() {
                return Some(last);
            }
        }
        let optional = self.optional_arguments();
        let offset = position.checked_sub(self.mandatory.len())?;
        if let Some(argument) = optional.get(offset) {
            return Some(argument);
        }
        match optional.last() {
            Some(last) if last.is_greedy() => Some(last),
            _ => None,
        }
    }
}

/// Fluent construction path for `CommandNode`; `build` rejects malformed
/// trees instead of deferring checks to dispatch time.
pub struct CommandNodeBuilder {
    name: String,
    description: String,
    permission: Option<Arc<Permission>>,
    player_only: bool,
    aliases: Vec<String>,
    mandatory: Vec<ArgumentSpec>,
    optional: Vec<ArgumentSpec>,
    preconditions: Vec<Precondition>,
    side_values: Vec<(String, SideValueSupplier)>,
    handler: Option<CommandHandler>,
    children: Vec<CommandNode>,
}

impl CommandNodeBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            permission: None,
            player_only: false,
            aliases: Vec::new(),
            mandatory: Vec::new(),
            optional: Vec::new(),
            preconditions: Vec::new(),
            side_values: Vec::new(),
            handler: None,
            children: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn permission(mut self, permission: Arc<Permission>) -> Self {
        self.permission = Some(permission);
        self
    }

    /// Convenience for `permission(Permission::get(name))`.
    pub fn permission_name(mut self, name: &str) -> Self {
        self.permission = Some(Permission::get(name));
        self
    }

    pub fn player_only(mut self) -> Self {
        self.player_only = true;
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn mandatory(mut self, argument: ArgumentSpec) -> Self {
        self.mandatory.push(argument);
        self
    }

    pub fn optional(mut self, argument: ArgumentSpec) -> Self {
        self.optional.push(argument);
        self
    }

    pub fn precondition<F>(mut self, failure_message: Option<&str>, check: F) -> Self
    where
        F: Fn(&Environment) -> bool + Send + Sync + 'static,
    {
        self.preconditions.push(Precondition {
            check: Arc::new(check),
            failure_message: failure_message.map(str::to_string),
        });
        self
    }

    /// Registers a named side value computed against the environment after
    /// argument parsing; suppliers run in registration order and may read
    /// previously injected values.
    pub fn side_value<F>(mut self, name: impl Into<String>, supplier: F) -> Self
    where
        F: Fn(&Environment) -> Value + Send + Sync + 'static,
    {
        self.side_values.push((name.into(), Arc::new(supplier)));
        self
    }

    pub fn handler(mut self, handler: CommandHandler) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn handler_fn<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut Environment, &CommandNode) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn child(mut self, child: CommandNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn build(self) -> Result<CommandNode, TreeBuildError> {
        if !is_valid_command_name(&self.name) {
            return Err(TreeBuildError::InvalidCommandName(self.name));
        }
        let mut alias_names = HashSet::new();
        for alias in &self.aliases {
            if !is_valid_command_name(alias) || alias == &self.name {
                return Err(TreeBuildError::InvalidAlias {
                    command: self.name,
                    alias: alias.clone(),
                });
            }
            if !alias_names.insert(alias.clone()) {
                return Err(TreeBuildError::InvalidAlias {
                    command: self.name,
                    alias: alias.clone(),
                });
            }
        }

        let mut argument_names = HashSet::new();
        let argument_count = self.mandatory.len() + self.optional.len();
        for (index, argument) in self.mandatory.iter().chain(self.optional.iter()).enumerate() {
            if !is_valid_command_name(argument.name()) {
                return Err(TreeBuildError::InvalidArgumentName {
                    command: self.name,
                    argument: argument.name().to_string(),
                });
            }
            if !argument_names.insert(argument.name().to_string()) {
                return Err(TreeBuildError::DuplicateArgumentName {
                    command: self.name,
                    argument: argument.name().to_string(),
                });
            }
            if argument.is_greedy() && index + 1 != argument_count {
                return Err(TreeBuildError::GreedyArgumentNotLast {
                    command: self.name,
                    argument: argument.name().to_string(),
                });
            }
        }
        for argument in &self.mandatory {
            if argument.has_default() {
                return Err(TreeBuildError::DefaultOnMandatoryArgument {
                    command: self.name,
                    argument: argument.name().to_string(),
                });
            }
        }

        if !self.optional.is_empty() {
            if let Some(child) = self.children.first() {
                return Err(TreeBuildError::OptionalArgumentsWithChildren {
                    command: self.name,
                    child: child.name.clone(),
                });
            }
        }

        let body = if self.children.is_empty() {
            CommandNodeBody::Leaf {
                optional: self.optional,
            }
        } else {
            let mut names = BTreeMap::new();
            let mut aliases = BTreeMap::new();
            let mut taken = HashSet::new();
            for (index, child) in self.children.iter().enumerate() {
                if !taken.insert(child.name.clone()) {
                    return Err(TreeBuildError::DuplicateChildName {
                        command: self.name,
                        name: child.name.clone(),
                    });
                }
                names.insert(child.name.clone(), index);
                for alias in &child.aliases {
                    if !taken.insert(alias.clone()) {
                        return Err(TreeBuildError::DuplicateChildName {
                            command: self.name,
                            name: alias.clone(),
                        });
                    }
                    aliases.insert(alias.clone(), index);
                }
            }
            CommandNodeBody::Branch {
                children: self.children,
                names,
                aliases,
            }
        };

        Ok(CommandNode {
            name: self.name,
            description: self.description,
            permission: self.permission,
            player_only: self.player_only,
            aliases: self.aliases,
            mandatory: self.mandatory,
            preconditions: self.preconditions,
            side_values: self.side_values,
            handler: self.handler,
            body,
        })
    }
}

/// Valid command, alias, and argument names: ASCII alphabetic first
/// character, then alphanumerics, `_`, or `-`.
pub fn is_valid_command_name(raw: &str) -> bool {
    let mut chars = raw.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_alphabetic() {
        return false;
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
}
