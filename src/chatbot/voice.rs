//! Voice notes to text: download, convert to WAV, transcribe.
//!
//! Every temporary file is held as a [`TempPath`], so it is deleted when the
//! pipeline returns, whichever stage stopped it.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempPath;
use tracing::{debug, info};

use crate::chatbot::completion::BackendError;
use crate::chatbot::delivery::{DeliveryError, Transport};

/// Why a voice turn was abandoned.
#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    #[error("download failed: {0}")]
    Download(#[from] DeliveryError),
    #[error("conversion failed: {0}")]
    Conversion(String),
    #[error("transcription failed: {0}")]
    Transcription(#[from] BackendError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Converts downloaded audio into a WAV file.
#[async_trait]
pub trait AudioConverter: Send + Sync {
    async fn to_waveform(&self, input: &Path) -> Result<TempPath, VoiceError>;
}

/// Speech-to-text backend.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, wav: Vec<u8>) -> Result<String, BackendError>;
}

pub struct VoicePipeline {
    transport: Arc<dyn Transport>,
    converter: Arc<dyn AudioConverter>,
    transcriber: Arc<dyn Transcriber>,
}

impl VoicePipeline {
    pub fn new(
        transport: Arc<dyn Transport>,
        converter: Arc<dyn AudioConverter>,
        transcriber: Arc<dyn Transcriber>,
    ) -> Self {
        Self { transport, converter, transcriber }
    }

    /// Turn a voice attachment into its transcript.
    pub async fn transcribe(&self, chat_id: i64, file_id: &str) -> Result<String, VoiceError> {
        let downloaded = self.transport.download_file(file_id).await?;
        debug!("Chat {}: voice downloaded to {:?}", chat_id, downloaded);

        let wav = self.converter.to_waveform(&downloaded).await?;
        let audio = tokio::fs::read(&wav).await?;
        debug!("Chat {}: converted to {} bytes of WAV", chat_id, audio.len());

        let text = self.transcriber.transcribe(audio).await?;
        info!("🎤 Chat {}: transcribed \"{}\"", chat_id, truncate(&text, 100));
        Ok(text)
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 5), "hello...");
        assert_eq!(truncate("привет мир", 6), "привет...");
    }
}
