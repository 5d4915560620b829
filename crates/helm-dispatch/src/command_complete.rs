//! Completion candidates mirroring the dispatch walk.
//!
//! All but the last token replay execution: positional arguments parse
//! into the environment so later completers stay context-aware, and child
//! names recurse. The final (possibly partial) token yields either the
//! positional argument's candidates or, at the child-name position, the
//! prefix-filtered names and aliases of every visible child.

use std::sync::Arc;

use helm_access::Invoker;

use crate::command_node::{CommandNode, HELP_COMMAND_NAME};
use crate::environment::{Environment, ParsedArgument};

impl CommandNode {
    /// Candidates for the final token of `tokens`, or `None` when nothing
    /// can complete here (distinct from an empty candidate list).
    pub fn complete(&self, invoker: Arc<dyn Invoker>, tokens: &[String]) -> Option<Vec<String>> {
        let mut environment = Environment::new(invoker);
        self.complete_inner(tokens, &mut environment)
    }

    fn complete_inner(
        &self,
        tokens: &[String],
        environment: &mut Environment,
    ) -> Option<Vec<String>> {
        let mut position = 0usize;
        let mut index = 0usize;
        while index + 1 < tokens.len() {
            let token = tokens[index].as_str();
            match self.argument_at(position) {
                Some(argument) => {
                    // Any token an argument cannot parse poisons the rest
                    // of the line.
                    let value = argument.parse_token(token, environment).ok()?;
                    environment.set_argument(ParsedArgument {
                        name: argument.name().to_string(),
                        raw: token.to_string(),
                        value,
                    });
                    position += 1;
                    index += 1;
                }
                None => {
                    let child = self.find_child(token)?;
                    return child.complete_inner(&tokens[index + 1..], environment);
                }
            }
        }

        let partial = tokens.last().map(String::as_str).unwrap_or("");
        if let Some(argument) = self.argument_at(position) {
            let candidates = argument.complete(partial, environment)?;
            return Some(filter_by_prefix(candidates, partial));
        }
        if position == self.mandatory.len() {
            let mut candidates = Vec::new();
            for child in self.children() {
                if child.visible_to(environment.invoker()) {
                    candidates.push(child.name().to_string());
                    candidates.extend(child.aliases().iter().cloned());
                }
            }
            if self.builtin_help_enabled() {
                candidates.push(HELP_COMMAND_NAME.to_string());
            }
            return Some(filter_by_prefix(candidates, partial));
        }
        None
    }
}

fn filter_by_prefix(candidates: Vec<String>, prefix: &str) -> Vec<String> {
    candidates
        .into_iter()
        .filter(|candidate| candidate.starts_with(prefix))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use helm_access::{Invoker, Permission};

    use crate::command_argument::ArgumentSpec;
    use crate::command_node::CommandNode;

    #[derive(Default)]
    struct SettingsInvoker {
        settings: BTreeMap<String, bool>,
    }

    impl Invoker for SettingsInvoker {
        fn send_message(&self, _message: &str) {}

        fn permission_setting(&self, permission: &str) -> Option<bool> {
            self.settings.get(permission).copied()
        }
    }

    fn invoker() -> Arc<SettingsInvoker> {
        Arc::new(SettingsInvoker::default())
    }

    fn tokens(line: &str) -> Vec<String> {
        line.split(' ').map(str::to_string).collect()
    }

    #[test]
    fn functional_child_names_complete_by_prefix() {
        let node = CommandNode::builder("root")
            .child(CommandNode::builder("foo").build().expect("foo"))
            .build()
            .expect("root");
        assert_eq!(
            node.complete(invoker(), &tokens("f")),
            Some(vec!["foo".to_string()])
        );
    }

    #[test]
    fn functional_empty_partial_lists_children_aliases_and_help() {
        let node = CommandNode::builder("root")
            .child(
                CommandNode::builder("teleport")
                    .alias("tp")
                    .build()
                    .expect("teleport"),
            )
            .build()
            .expect("root");
        assert_eq!(
            node.complete(invoker(), &tokens("")),
            Some(vec![
                "teleport".to_string(),
                "tp".to_string(),
                "help".to_string(),
            ])
        );
    }

    #[test]
    fn functional_children_without_permission_are_hidden() {
        let node = CommandNode::builder("root")
            .child(
                CommandNode::builder("open")
                    .build()
                    .expect("open"),
            )
            .child(
                CommandNode::builder("locked")
                    .permission(Permission::get("completetest.locked"))
                    .build()
                    .expect("locked"),
            )
            .build()
            .expect("root");
        assert_eq!(
            node.complete(invoker(), &tokens("")),
            Some(vec!["open".to_string(), "help".to_string()])
        );
    }

    #[test]
    fn functional_argument_candidates_filter_by_prefix() {
        let node = CommandNode::builder("paint")
            .mandatory(ArgumentSpec::choice("color", &["red", "green", "grey"]))
            .build()
            .expect("paint");
        assert_eq!(
            node.complete(invoker(), &tokens("gr")),
            Some(vec!["green".to_string(), "grey".to_string()])
        );
    }

    #[test]
    fn functional_word_argument_offers_no_completions() {
        let node = CommandNode::builder("msg")
            .mandatory(ArgumentSpec::word("target"))
            .build()
            .expect("msg");
        assert_eq!(node.complete(invoker(), &tokens("an")), None);
    }

    #[test]
    fn functional_parse_failure_aborts_the_whole_call() {
        let node = CommandNode::builder("fill")
            .mandatory(ArgumentSpec::integer("amount"))
            .mandatory(ArgumentSpec::choice("unit", &["stacks", "items"]))
            .build()
            .expect("fill");
        assert_eq!(node.complete(invoker(), &tokens("12 st")), Some(vec!["stacks".to_string()]));
        assert_eq!(node.complete(invoker(), &tokens("twelve st")), None);
    }

    #[test]
    fn functional_recurses_into_children_with_remaining_tokens() {
        let node = CommandNode::builder("root")
            .child(
                CommandNode::builder("warp")
                    .mandatory(ArgumentSpec::choice("where", &["home", "hub"]))
                    .build()
                    .expect("warp"),
            )
            .build()
            .expect("root");
        assert_eq!(
            node.complete(invoker(), &tokens("warp h")),
            Some(vec!["home".to_string(), "hub".to_string()])
        );
        assert_eq!(node.complete(invoker(), &tokens("nope h")), None);
    }

    #[test]
    fn functional_earlier_tokens_parse_for_context_aware_completers() {
        let node = CommandNode::builder("give")
            .mandatory(ArgumentSpec::word("target"))
            .mandatory(
                ArgumentSpec::word("gift").with_completer(Arc::new(|_partial, environment| {
                    let target: String = environment.get("target").unwrap_or_default();
                    vec![format!("{target}-hat"), format!("{target}-boots")]
                })),
            )
            .build()
            .expect("give");
        assert_eq!(
            node.complete(invoker(), &tokens("alice alice-h")),
            Some(vec!["alice-hat".to_string()])
        );
    }

    #[test]
    fn functional_positions_past_capacity_complete_nothing() {
        let node = CommandNode::builder("msg")
            .mandatory(ArgumentSpec::word("target"))
            .build()
            .expect("msg");
        // Position past the arguments, and past the child-name slot.
        assert_eq!(node.complete(invoker(), &tokens("alice x y")), None);
    }
}
