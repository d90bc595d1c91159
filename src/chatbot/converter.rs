//! Audio conversion through an external ffmpeg process.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tempfile::TempPath;
use tokio::process::Command;
use tracing::debug;

use crate::chatbot::voice::{AudioConverter, VoiceError};

/// Converts Telegram voice notes (OGG Opus) to 16-bit mono 44.1KHz WAV.
pub struct FfmpegConverter {
    ffmpeg: PathBuf,
}

impl FfmpegConverter {
    pub fn new(ffmpeg: impl Into<PathBuf>) -> Self {
        Self { ffmpeg: ffmpeg.into() }
    }
}

#[async_trait]
impl AudioConverter for FfmpegConverter {
    async fn to_waveform(&self, input: &Path) -> Result<TempPath, VoiceError> {
        let output_path = tempfile::Builder::new()
            .prefix("voice-")
            .suffix(".wav")
            .tempfile()?
            .into_temp_path();

        let output = Command::new(&self.ffmpeg)
            .arg("-y")
            .arg("-i")
            .arg(input)
            .args(["-acodec", "pcm_s16le", "-ac", "1", "-ar", "44100", "-f", "wav"])
            .arg(&*output_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| VoiceError::Conversion(format!("failed to run {}: {e}", self.ffmpeg.display())))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail: String = stderr.lines().rev().take(3).collect::<Vec<_>>().join(" | ");
            return Err(VoiceError::Conversion(format!("ffmpeg exited with {}: {tail}", output.status)));
        }

        debug!("Converted {:?} to {:?}", input, output_path);
        Ok(output_path)
    }
}
