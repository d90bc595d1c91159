//! Per-chat conversation history.
//!
//! Each chat keeps at most `history_size` messages. Turns are recorded as a
//! user/assistant pair and the oldest messages are evicted first.
//!
//! Histories live in a sharded map, so writers to the same chat serialize
//! while different chats only contend when they hash to the same shard.
//! Two messages racing in one chat are recorded in whatever order they
//! reach the map; arrival order is not enforced.

use std::collections::VecDeque;

use dashmap::DashMap;
use tracing::debug;

use crate::chatbot::message::TurnMessage;

/// In-memory store of chat histories. Nothing survives a restart.
pub struct SessionStore {
    histories: DashMap<i64, VecDeque<TurnMessage>>,
    history_size: usize,
    system_prompt: Option<String>,
}

impl SessionStore {
    pub fn new(history_size: usize, system_prompt: Option<String>) -> Self {
        Self {
            histories: DashMap::new(),
            history_size,
            system_prompt,
        }
    }

    /// Build the prompt for a new user message: the system preamble (if
    /// configured), the stored history in order, then `text`.
    pub fn assemble_prompt(&self, chat_id: i64, text: &str) -> Vec<TurnMessage> {
        let mut prompt = Vec::new();

        if let Some(ref preamble) = self.system_prompt {
            prompt.push(TurnMessage::system(preamble.clone()));
        }
        if let Some(history) = self.histories.get(&chat_id) {
            prompt.extend(history.iter().cloned());
        }
        prompt.push(TurnMessage::user(text));
        prompt
    }

    /// Append a user/assistant pair and evict from the front down to the bound.
    pub fn record_turn(&self, chat_id: i64, user_text: &str, assistant_text: &str) {
        let mut history = self.histories.entry(chat_id).or_default();
        history.push_back(TurnMessage::user(user_text));
        history.push_back(TurnMessage::assistant(assistant_text));

        while history.len() > self.history_size {
            history.pop_front();
        }
        debug!("Chat {} history now has {} message(s)", chat_id, history.len());
    }

    /// Forget a chat's history. Clearing an unknown chat is a no-op.
    pub fn clear(&self, chat_id: i64) {
        self.histories.remove(&chat_id);
    }

    /// Snapshot of a chat's stored history.
    pub fn history(&self, chat_id: i64) -> Vec<TurnMessage> {
        self.histories
            .get(&chat_id)
            .map(|h| h.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of chats with a stored history.
    pub fn chat_count(&self) -> usize {
        self.histories.len()
    }
}
