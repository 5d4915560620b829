//! Usage listings and pagination.
//!
//! One `<name> <bracketed-argument-list> : <description>` line per entry:
//! the node's own line first when it carries a description, then every
//! permission-visible child in registration order, then the synthesized
//! `help` entry. Listings paginate at eight entries per page.

use helm_access::Invoker;

use crate::command_node::{CommandNode, HELP_COMMAND_NAME};
use crate::dispatch_error::HelpPageOutOfRange;

pub const HELP_PAGE_SIZE: usize = 8;

/// Number of pages needed for `entry_count` entries (never zero).
pub fn help_page_count(entry_count: usize) -> usize {
    entry_count.div_ceil(HELP_PAGE_SIZE).max(1)
}

impl CommandNode {
    /// Every usage line the invoker is allowed to see at this node.
    pub fn help_entries(&self, invoker: &dyn Invoker) -> Vec<String> {
        let mut entries = Vec::new();
        if !self.description.is_empty() {
            entries.push(self.usage_line());
        }
        for child in self.children() {
            if child.visible_to(invoker) {
                entries.push(child.usage_line());
            }
        }
        if self.builtin_help_enabled() {
            entries.push(format!(
                "{HELP_COMMAND_NAME} [page] : lists available subcommands"
            ));
        }
        entries
    }

    /// Whether help and completion listings include this node for
    /// `invoker`. Reaching it directly by name is still possible; the
    /// permission gate itself sits in front of the handler.
    pub fn visible_to(&self, invoker: &dyn Invoker) -> bool {
        self.permission
            .as_ref()
            .map_or(true, |permission| permission.allows(invoker))
    }

    fn usage_line(&self) -> String {
        let usage = self.argument_usage();
        if usage.is_empty() {
            format!("{} : {}", self.name, self.description)
        } else {
            format!("{} {} : {}", self.name, usage, self.description)
        }
    }

    /// Mandatory arguments render as `<name>`, optional ones as `[name]`.
    pub fn argument_usage(&self) -> String {
        let mut parts: Vec<String> = self
            .mandatory
            .iter()
            .map(|argument| format!("<{}>", argument.name()))
            .collect();
        for argument in self.optional_arguments() {
            parts.push(format!("[{}]", argument.name()));
        }
        parts.join(" ")
    }

    /// The entries of page `page_index`; a page past the end is an error
    /// for the caller to resolve.
    pub fn help_page(
        &self,
        invoker: &dyn Invoker,
        page_index: usize,
    ) -> Result<Vec<String>, HelpPageOutOfRange> {
        let entries = self.help_entries(invoker);
        let pages = help_page_count(entries.len());
        if page_index >= pages {
            return Err(HelpPageOutOfRange {
                requested: page_index,
                pages,
            });
        }
        let start = page_index * HELP_PAGE_SIZE;
        let end = (start + HELP_PAGE_SIZE).min(entries.len());
        Ok(entries[start..end].to_vec())
    }

    pub(crate) fn show_help_first_page(&self, invoker: &dyn Invoker) {
        self.send_help_page_or_first(invoker, 0);
    }

    /// Sends one help page, falling back to the first page when the
    /// requested index is out of range.
    pub(crate) fn send_help_page_or_first(&self, invoker: &dyn Invoker, page_index: usize) {
        let (shown_index, lines) = match self.help_page(invoker, page_index) {
            Ok(lines) => (page_index, lines),
            Err(_) => (0, self.help_page(invoker, 0).unwrap_or_default()),
        };
        let pages = help_page_count(self.help_entries(invoker).len());
        let mut message = vec![format!(
            "--- {} help ({}/{}) ---",
            self.name,
            shown_index + 1,
            pages
        )];
        message.extend(lines);
        invoker.send_message(&message.join("\n"));
    }
}
