//! End-to-end dispatch, completion, and help flows over a realistic
//! moderation command tree, built both through the builder API and from a
//! declarative spec file.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Context;
use helm_access::{Invoker, Permission};
use helm_dispatch::{
    split_command_line, ArgumentSpec, CommandNode, NO_PERMISSION_MESSAGE, PLAYER_ONLY_MESSAGE,
};
use helm_spec::{compile_command_spec_file, parse_command_spec_file, HandlerRegistry};
use serde_json::json;

#[derive(Default)]
struct RecordingInvoker {
    player: bool,
    operator: bool,
    settings: BTreeMap<String, bool>,
    messages: RefCell<Vec<String>>,
}

impl RecordingInvoker {
    fn player_with(settings: &[(&str, bool)]) -> Arc<Self> {
        Arc::new(Self {
            player: true,
            operator: false,
            settings: settings
                .iter()
                .map(|(name, value)| (name.to_string(), *value))
                .collect(),
            messages: RefCell::new(Vec::new()),
        })
    }

    fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

impl Invoker for RecordingInvoker {
    fn send_message(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }

    fn is_operator(&self) -> bool {
        self.operator
    }

    fn is_player(&self) -> bool {
        self.player
    }

    fn permission_setting(&self, permission: &str) -> Option<bool> {
        self.settings.get(permission).copied()
    }
}

/// A `mod` root with kick/ban/mute subcommands, permissioned per subtree.
fn moderation_tree() -> CommandNode {
    CommandNode::builder("mod")
        .description("moderation tools")
        .child(
            CommandNode::builder("kick")
                .description("kicks a target from the server")
                .permission(Permission::get("integration.moderation.kick"))
                .mandatory(ArgumentSpec::word("target"))
                .mandatory(ArgumentSpec::text("reason"))
                .handler_fn(|environment, _node| {
                    let target: String = environment.get("target").context("target")?;
                    let reason: String = environment.get("reason").context("reason")?;
                    environment
                        .invoker()
                        .send_message(&format!("kicked {target} ({reason})"));
                    Ok(())
                })
                .build()
                .expect("kick"),
        )
        .child(
            CommandNode::builder("ban")
                .description("bans a target")
                .alias("banish")
                .permission(Permission::get("integration.moderation.ban"))
                .mandatory(ArgumentSpec::word("target"))
                .optional(ArgumentSpec::integer_in_range("days", 1, 365).with_default_value(json!(7)))
                .handler_fn(|environment, _node| {
                    let target: String = environment.get("target").context("target")?;
                    let days: i64 = environment.get("days").context("days")?;
                    environment
                        .invoker()
                        .send_message(&format!("banned {target} for {days}d"));
                    Ok(())
                })
                .build()
                .expect("ban"),
        )
        .child(
            CommandNode::builder("vanish")
                .description("toggles visibility")
                .permission(Permission::get("integration.moderation.vanish"))
                .player_only()
                .handler_fn(|environment, _node| {
                    environment.invoker().send_message("now invisible");
                    Ok(())
                })
                .build()
                .expect("vanish"),
        )
        .build()
        .expect("mod root")
}

#[test]
fn integration_dispatch_routes_arguments_permissions_and_aliases() {
    let tree = moderation_tree();

    let moderator = RecordingInvoker::player_with(&[("integration.moderation.*", true)]);
    assert!(tree.execute(
        moderator.clone(),
        &split_command_line("kick griefer repeated grief at spawn")
    ));
    assert!(tree.execute(moderator.clone(), &split_command_line("banish griefer")));
    assert!(tree.execute(moderator.clone(), &split_command_line("ban griefer 30")));
    assert_eq!(
        moderator.messages(),
        [
            "kicked griefer (repeated grief at spawn)",
            "banned griefer for 7d",
            "banned griefer for 30d",
        ]
    );

    let bystander = RecordingInvoker::player_with(&[]);
    assert!(!tree.execute(bystander.clone(), &split_command_line("ban griefer")));
    assert_eq!(bystander.messages(), [NO_PERMISSION_MESSAGE]);
}

#[test]
fn integration_player_only_and_wildcard_deny_overrides() {
    let tree = moderation_tree();

    let console = Arc::new(RecordingInvoker {
        operator: true,
        ..RecordingInvoker::default()
    });
    assert!(!tree.execute(console.clone(), &split_command_line("vanish")));
    assert_eq!(console.messages(), [PLAYER_ONLY_MESSAGE]);

    // Subtree-wide grant with one specific deny on top of it.
    let limited = RecordingInvoker::player_with(&[
        ("integration.moderation.*", true),
        ("integration.moderation.ban", false),
    ]);
    assert!(tree.execute(limited.clone(), &split_command_line("vanish")));
    assert!(!tree.execute(limited.clone(), &split_command_line("ban griefer")));
    assert_eq!(
        limited.messages(),
        ["now invisible", NO_PERMISSION_MESSAGE]
    );
}

#[test]
fn integration_completion_mirrors_permissions_and_arguments() {
    let tree = moderation_tree();

    let moderator = RecordingInvoker::player_with(&[("integration.moderation.*", true)]);
    assert_eq!(
        tree.complete(moderator.clone(), &split_command_line("ba")),
        Some(vec!["ban".to_string(), "banish".to_string()])
    );

    // Without any grants only the help entry remains visible.
    let bystander = RecordingInvoker::player_with(&[]);
    let candidates = tree
        .complete(bystander.clone(), &[String::new()])
        .expect("candidate list");
    assert_eq!(candidates, vec!["help".to_string()]);

    // Arguments with no completer yield the none sentinel.
    assert_eq!(
        tree.complete(moderator.clone(), &split_command_line("kick gri")),
        None
    );
}

#[test]
fn integration_help_listing_paginates_through_the_help_child() {
    let tree = moderation_tree();
    let moderator = RecordingInvoker::player_with(&[("integration.moderation.*", true)]);

    assert!(tree.execute(moderator.clone(), &split_command_line("help")));
    let messages = moderator.messages();
    assert_eq!(messages.len(), 1);
    let listing = &messages[0];
    assert!(listing.starts_with("--- mod help (1/1) ---"));
    assert!(listing.contains("kick <target> <reason> : kicks a target from the server"));
    assert!(listing.contains("ban <target> [days] : bans a target"));
    assert!(listing.contains("help [page] : lists available subcommands"));

    // A page past the end falls back to the first page.
    assert!(tree.execute(moderator.clone(), &split_command_line("help 9")));
    assert!(moderator.messages()[1].starts_with("--- mod help (1/1) ---"));
}

#[test]
fn integration_spec_compiled_tree_matches_builder_behavior() {
    let spec = r#"{
        "commands": [
            {
                "name": "region",
                "description": "region management",
                "children": [
                    {
                        "name": "flag",
                        "description": "sets a region flag",
                        "permission": "integration.region.flag",
                        "handler": "set-flag",
                        "arguments": [
                            {"name": "region", "kind": "word"},
                            {"name": "state", "kind": "choice", "choices": ["allow", "deny"]}
                        ]
                    },
                    {
                        "name": "info",
                        "description": "shows region info",
                        "handler": "info",
                        "aliases": ["i"]
                    }
                ]
            }
        ]
    }"#;

    let mut registry = HandlerRegistry::new();
    registry
        .register_fn("set-flag", |environment, _node| {
            let region: String = environment.get("region").context("region")?;
            let state: String = environment.get("state").context("state")?;
            environment
                .invoker()
                .send_message(&format!("{region}={state}"));
            Ok(())
        })
        .expect("set-flag");
    registry
        .register_fn("info", |environment, node| {
            environment.invoker().send_message(node.name());
            Ok(())
        })
        .expect("info");

    let file = parse_command_spec_file(spec).expect("spec");
    let roots = compile_command_spec_file(&file, &registry).expect("compile");
    let region = &roots[0];

    let admin = RecordingInvoker::player_with(&[("integration.region.flag", true)]);
    assert!(region.execute(admin.clone(), &split_command_line("flag spawn deny")));
    assert!(region.execute(admin.clone(), &split_command_line("i")));
    assert_eq!(admin.messages(), ["spawn=deny", "info"]);

    assert_eq!(
        region.complete(admin.clone(), &split_command_line("flag spawn a")),
        Some(vec!["allow".to_string()])
    );

    // Unknown trailing input resolves to the usage listing, not a crash.
    assert!(!region.execute(admin.clone(), &split_command_line("flag spawn deny extra")));
    assert!(admin.messages()[2].starts_with("--- flag help"));
}
