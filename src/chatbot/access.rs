//! Whitelist check for inbound senders.

use crate::chatbot::message::Sender;

/// Check whether `sender` may talk to the bot.
///
/// An empty whitelist lets everyone in. Otherwise the sender's username has
/// to equal *every* entry, so the list only works with a single name: two
/// distinct entries reject all senders. See DESIGN.md before switching this
/// to a membership check.
pub fn is_authorized(whitelist: &[String], sender: &Sender) -> bool {
    if whitelist.is_empty() {
        return true;
    }
    whitelist
        .iter()
        .all(|entry| sender.username.as_deref() == Some(entry.as_str()))
}
