//! Outbound side of the chat transport.

use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempPath;
use tracing::{info, warn};

/// Errors from the chat transport.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("failed to send: {0}")]
    Send(String),
    #[error("failed to download file: {0}")]
    Download(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// The chat platform the bot talks through.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `text` to a chat, optionally as a reply. Returns the new message id.
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_to_message_id: Option<i64>,
    ) -> Result<i64, DeliveryError>;

    /// Download an attachment into a temporary file, deleted when dropped.
    async fn download_file(&self, file_id: &str) -> Result<TempPath, DeliveryError>;
}

/// Sends replies and reports failures as values.
pub struct Delivery {
    transport: Arc<dyn Transport>,
}

impl Delivery {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn deliver(
        &self,
        chat_id: i64,
        text: &str,
        reply_to_message_id: Option<i64>,
    ) -> Result<i64, DeliveryError> {
        match self.transport.send_message(chat_id, text, reply_to_message_id).await {
            Ok(message_id) => {
                info!("📤 Sent msg {} to chat {}", message_id, chat_id);
                Ok(message_id)
            }
            Err(e) => {
                warn!("Delivery to chat {} failed: {e}", chat_id);
                Err(e)
            }
        }
    }
}
