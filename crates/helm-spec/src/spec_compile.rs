//! Compiles validated command specs into executable command nodes.
//!
//! Each spec node becomes one builder invocation; unknown handler ids and
//! builder violations fail fast with the offending command named in the
//! error chain.

use anyhow::{bail, Context, Result};
use helm_access::Permission;
use helm_dispatch::{ArgumentSpec, CommandNode};

use crate::command_spec::{
    validate_command_spec_file, CommandArgumentKind, CommandArgumentSpecEntry, CommandSpecFile,
    CommandSpecNode,
};
use crate::handler_registry::HandlerRegistry;

/// Validates `file` and compiles every top-level command against
/// `registry`, in declaration order.
pub fn compile_command_spec_file(
    file: &CommandSpecFile,
    registry: &HandlerRegistry,
) -> Result<Vec<CommandNode>> {
    validate_command_spec_file(file)?;
    file.commands
        .iter()
        .map(|command| compile_command_spec_node(command, registry))
        .collect()
}

pub fn compile_command_spec_node(
    node: &CommandSpecNode,
    registry: &HandlerRegistry,
) -> Result<CommandNode> {
    let mut builder = CommandNode::builder(node.name.as_str())
        .description(node.description.as_str());
    if !node.permission.is_empty() {
        builder = builder.permission(Permission::get(&node.permission));
    }
    if node.player_only {
        builder = builder.player_only();
    }
    for alias in &node.aliases {
        builder = builder.alias(alias.as_str());
    }
    for argument in &node.arguments {
        let compiled = compile_argument_entry(argument);
        builder = if argument.optional {
            builder.optional(compiled)
        } else {
            builder.mandatory(compiled)
        };
    }
    if !node.handler.is_empty() {
        let Some(handler) = registry.get(&node.handler) else {
            bail!(
                "command `{}` references unknown handler `{}`",
                node.name,
                node.handler
            );
        };
        builder = builder.handler(handler);
    }
    for child in &node.children {
        builder = builder.child(compile_command_spec_node(child, registry)?);
    }
    builder
        .build()
        .with_context(|| format!("failed to build command `{}`", node.name))
}

fn compile_argument_entry(entry: &CommandArgumentSpecEntry) -> ArgumentSpec {
    let mut compiled = match entry.kind {
        CommandArgumentKind::Word => ArgumentSpec::word(entry.name.as_str()),
        CommandArgumentKind::Integer => match (entry.min, entry.max) {
            (None, None) => ArgumentSpec::integer(entry.name.as_str()),
            (min, max) => ArgumentSpec::integer_in_range(
                entry.name.as_str(),
                min.unwrap_or(i64::MIN),
                max.unwrap_or(i64::MAX),
            ),
        },
        CommandArgumentKind::Float => ArgumentSpec::float(entry.name.as_str()),
        CommandArgumentKind::Boolean => ArgumentSpec::boolean(entry.name.as_str()),
        CommandArgumentKind::Choice => {
            let choices: Vec<&str> = entry.choices.iter().map(String::as_str).collect();
            ArgumentSpec::choice(entry.name.as_str(), &choices)
        }
        CommandArgumentKind::Text => ArgumentSpec::text(entry.name.as_str()),
    };
    if let Some(default) = &entry.default {
        compiled = compiled.with_default_value(default.clone());
    }
    compiled
}
