//! Text completion: request assembly and the failure sentinel.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::chatbot::message::TurnMessage;

/// Reply used in place of a real answer when the backend fails.
pub const FALLBACK_REPLY: &str = "oops";

/// Errors from the completion or transcription backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("parse error: {0}")]
    Parse(String),
    #[error("empty response")]
    Empty,
}

/// Sampling parameters sent with every completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParams {
    pub model: String,
    pub temperature: f64,
    pub top_p: f64,
}

/// Request body for a chat completion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<TurnMessage>,
    pub temperature: f64,
    pub top_p: f64,
}

/// A backend able to answer a chat completion request.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Return the content of the first choice.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError>;
}

/// Turns a prompt into a reply, never failing.
pub struct Completer {
    backend: Arc<dyn CompletionBackend>,
    params: ModelParams,
}

impl Completer {
    pub fn new(backend: Arc<dyn CompletionBackend>, params: ModelParams) -> Self {
        Self { backend, params }
    }

    pub fn request_for(&self, prompt: Vec<TurnMessage>) -> CompletionRequest {
        CompletionRequest {
            model: self.params.model.clone(),
            messages: prompt,
            temperature: self.params.temperature,
            top_p: self.params.top_p,
        }
    }

    /// Ask the backend for a reply. Any failure is logged and replaced by
    /// [`FALLBACK_REPLY`].
    pub async fn complete(&self, chat_id: i64, prompt: Vec<TurnMessage>) -> String {
        let request = self.request_for(prompt);
        info!("🤖 Completion for chat {}: {} message(s)", chat_id, request.messages.len());

        match self.backend.complete(&request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Completion failed for chat {}: {e}", chat_id);
                FALLBACK_REPLY.to_string()
            }
        }
    }
}
