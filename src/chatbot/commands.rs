//! Bot commands and routing of inbound text.

use teloxide::utils::command::BotCommands;
use tracing::debug;

/// Prompt sent to the model on `/start`, so the greeting comes from the model.
pub const INTRODUCTION_PROMPT: &str = "Introduce yourself and offer your service. Be concise";

/// Reply to `/clean`.
pub const CLEARED_REPLY: &str = "Cache cleared";

/// Control directives understood by the bot.
#[derive(BotCommands, Debug, Clone, Copy, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    #[command(description = "forget the history of this chat")]
    Clean,
    #[command(description = "show the bot configuration")]
    Config,
    #[command(description = "ask the bot to introduce itself")]
    Start,
}

/// Where a piece of inbound text goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Command(Command),
    /// Command-prefixed text that is not a known command. Dropped.
    Unknown(String),
    Conversation,
}

/// Classify raw text. `bot_username` lets `/clean@<bot>` resolve in groups.
pub fn route(text: &str, bot_username: &str) -> Route {
    if !text.starts_with('/') {
        return Route::Conversation;
    }
    match Command::parse(text, bot_username) {
        Ok(command) => Route::Command(command),
        Err(e) => {
            debug!("Not a known command {:?}: {e}", text);
            Route::Unknown(text.to_string())
        }
    }
}
