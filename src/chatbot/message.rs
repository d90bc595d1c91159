//! Conversation turns and inbound chat events.

use serde::{Deserialize, Serialize};

/// Author of a turn in the prompt sent to the completion backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged message of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnMessage {
    pub role: Role,
    pub content: String,
}

impl TurnMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// The author of an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub user_id: i64,
    pub username: Option<String>,
}

impl Sender {
    /// Username if the account has one, numeric id otherwise.
    pub fn display(&self) -> String {
        match &self.username {
            Some(u) => u.clone(),
            None => self.user_id.to_string(),
        }
    }
}

/// Payload of an inbound message the engine knows how to handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    /// Voice note, referenced by the transport's file id.
    Voice { file_id: String },
}

/// An inbound chat message, independent of the transport library.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub chat_id: i64,
    pub message_id: i64,
    pub sender: Sender,
    pub content: Content,
}
