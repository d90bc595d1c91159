//! Telegram client using teloxide.

use async_trait::async_trait;
use tempfile::TempPath;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{FileId, MessageId, ReplyParameters};
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::chatbot::delivery::{DeliveryError, Transport};

/// Telegram API client.
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Transport for TelegramClient {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_to_message_id: Option<i64>,
    ) -> Result<i64, DeliveryError> {
        let mut request = self.bot.send_message(ChatId(chat_id), text);

        if let Some(msg_id) = reply_to_message_id {
            let reply_params = ReplyParameters::new(MessageId(msg_id as i32));
            request = request.reply_parameters(reply_params);
        }

        request
            .await
            .map(|msg| msg.id.0 as i64)
            .map_err(|e| DeliveryError::Send(e.to_string()))
    }

    async fn download_file(&self, file_id: &str) -> Result<TempPath, DeliveryError> {
        let file = self
            .bot
            .get_file(FileId(file_id.to_string()))
            .await
            .map_err(|e| DeliveryError::Download(format!("failed to get file info: {e}")))?;

        let path = tempfile::Builder::new()
            .prefix("voice-")
            .suffix(".oga")
            .tempfile()?
            .into_temp_path();

        let mut destination = tokio::fs::File::create(&path).await?;
        self.bot
            .download_file(&file.path, &mut destination)
            .await
            .map_err(|e| DeliveryError::Download(e.to_string()))?;
        destination.flush().await?;

        info!("📥 Downloaded {} to {:?}", file.path, path);
        Ok(path)
    }
}
