//! Capability surface of the actor that issued a command line.
//!
//! The dispatch engine never sees the host's actor representation; it only
//! needs to deliver text, distinguish player-class actors from consoles and
//! automation, and read explicit permission settings.

/// Trait contract for `Invoker` behavior.
pub trait Invoker {
    /// Delivers a plain-text message to the actor.
    fn send_message(&self, message: &str);

    /// Unrestricted operators bypass every permission check.
    fn is_operator(&self) -> bool {
        false
    }

    /// Whether the actor is a player-class actor rather than a console or
    /// automation principal.
    fn is_player(&self) -> bool {
        false
    }

    /// Explicit grant (`Some(true)`) or deny (`Some(false)`) configured for
    /// exactly `permission`, or `None` when the host has no setting for it.
    fn permission_setting(&self, permission: &str) -> Option<bool>;
}
