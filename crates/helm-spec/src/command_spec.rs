//! Serde model and validation for declarative command-tree specs.
//!
//! A spec file is the data-side description of a command tree: names,
//! aliases, permissions, argument shapes, and handler ids. Validation
//! fails fast with precise messages; compilation into executable nodes
//! lives in `spec_compile`.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use helm_dispatch::is_valid_command_name;

pub const COMMAND_SPEC_SCHEMA_VERSION: u32 = 1;

fn command_spec_schema_version() -> u32 {
    COMMAND_SPEC_SCHEMA_VERSION
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Enumerates supported `CommandArgumentKind` values.
pub enum CommandArgumentKind {
    Word,
    Integer,
    Float,
    Boolean,
    Choice,
    Text,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Public struct `CommandArgumentSpecEntry` used across Helm components.
pub struct CommandArgumentSpecEntry {
    pub name: String,
    pub kind: CommandArgumentKind,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub choices: Vec<String>,
    #[serde(default)]
    pub min: Option<i64>,
    #[serde(default)]
    pub max: Option<i64>,
    #[serde(default)]
    pub default: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Public struct `CommandSpecNode` used across Helm components.
pub struct CommandSpecNode {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub permission: String,
    #[serde(default)]
    pub player_only: bool,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub arguments: Vec<CommandArgumentSpecEntry>,
    #[serde(default)]
    pub children: Vec<CommandSpecNode>,
    #[serde(default)]
    pub handler: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Public struct `CommandSpecFile` used across Helm components.
pub struct CommandSpecFile {
    #[serde(default = "command_spec_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub commands: Vec<CommandSpecNode>,
}

pub fn load_command_spec_file(path: &Path) -> Result<CommandSpecFile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read command spec {}", path.display()))?;
    parse_command_spec_file(&raw)
        .with_context(|| format!("invalid command spec {}", path.display()))
}

pub fn parse_command_spec_file(raw: &str) -> Result<CommandSpecFile> {
    let parsed = serde_json::from_str::<CommandSpecFile>(raw)
        .context("failed to parse command spec")?;
    validate_command_spec_file(&parsed)?;
    Ok(parsed)
}

pub fn validate_command_spec_file(file: &CommandSpecFile) -> Result<()> {
    if file.schema_version != COMMAND_SPEC_SCHEMA_VERSION {
        bail!(
            "unsupported command spec schema version {} (expected {})",
            file.schema_version,
            COMMAND_SPEC_SCHEMA_VERSION
        );
    }
    let mut seen = HashSet::new();
    for command in &file.commands {
        if !seen.insert(command.name.clone()) {
            bail!("duplicate top-level command `{}`", command.name);
        }
        validate_command_spec_node(command)?;
    }
    Ok(())
}

pub fn validate_command_spec_node(node: &CommandSpecNode) -> Result<()> {
    if !is_valid_command_name(&node.name) {
        bail!("command spec has invalid name `{}`", node.name);
    }
    for alias in &node.aliases {
        if !is_valid_command_name(alias) {
            bail!("command `{}` has invalid alias `{}`", node.name, alias);
        }
        if alias == &node.name {
            bail!("command `{}` lists itself as an alias", node.name);
        }
    }
    if !node.permission.is_empty() && !is_valid_permission_name(&node.permission) {
        bail!(
            "command `{}` has invalid permission `{}`",
            node.name,
            node.permission
        );
    }
    validate_command_spec_arguments(node)?;

    let has_optional = node.arguments.iter().any(|argument| argument.optional);
    if has_optional && !node.children.is_empty() {
        bail!(
            "command `{}` mixes optional arguments with child commands",
            node.name
        );
    }
    let mut child_names = HashSet::new();
    for child in &node.children {
        if !child_names.insert(child.name.clone()) {
            bail!("command `{}` has duplicate child `{}`", node.name, child.name);
        }
        for alias in &child.aliases {
            if !child_names.insert(alias.clone()) {
                bail!(
                    "command `{}` has duplicate child name or alias `{}`",
                    node.name,
                    alias
                );
            }
        }
        validate_command_spec_node(child)?;
    }
    Ok(())
}

fn validate_command_spec_arguments(node: &CommandSpecNode) -> Result<()> {
    let mut seen = HashSet::new();
    let mut optional_seen = false;
    for (index, argument) in node.arguments.iter().enumerate() {
        if !is_valid_command_name(&argument.name) {
            bail!(
                "command `{}` has invalid argument name `{}`",
                node.name,
                argument.name
            );
        }
        if !seen.insert(argument.name.clone()) {
            bail!(
                "command `{}` has duplicate argument `{}`",
                node.name,
                argument.name
            );
        }
        if optional_seen && !argument.optional {
            bail!(
                "command `{}` places mandatory argument `{}` after an optional one",
                node.name,
                argument.name
            );
        }
        optional_seen |= argument.optional;
        if matches!(argument.kind, CommandArgumentKind::Text)
            && index + 1 != node.arguments.len()
        {
            bail!(
                "command `{}` places text argument `{}` before the end of the argument list",
                node.name,
                argument.name
            );
        }
        if matches!(argument.kind, CommandArgumentKind::Choice) && argument.choices.is_empty() {
            bail!(
                "command `{}` choice argument `{}` lists no choices",
                node.name,
                argument.name
            );
        }
        if !matches!(argument.kind, CommandArgumentKind::Choice) && !argument.choices.is_empty() {
            bail!(
                "command `{}` argument `{}` lists choices but is not a choice argument",
                node.name,
                argument.name
            );
        }
        if (argument.min.is_some() || argument.max.is_some())
            && !matches!(argument.kind, CommandArgumentKind::Integer)
        {
            bail!(
                "command `{}` argument `{}` sets integer bounds but is not an integer",
                node.name,
                argument.name
            );
        }
        if let (Some(min), Some(max)) = (argument.min, argument.max) {
            if min > max {
                bail!(
                    "command `{}` argument `{}` has min {} above max {}",
                    node.name,
                    argument.name,
                    min,
                    max
                );
            }
        }
        if argument.default.is_some() && !argument.optional {
            bail!(
                "command `{}` mandatory argument `{}` declares a default",
                node.name,
                argument.name
            );
        }
    }
    Ok(())
}

/// Valid permission names: one or more dotted segments, each following the
/// command-name rules.
pub fn is_valid_permission_name(raw: &str) -> bool {
    !raw.is_empty() && raw.split('.').all(is_valid_command_name)
}
