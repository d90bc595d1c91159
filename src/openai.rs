//! OpenAI-compatible HTTP client for chat completions and transcriptions.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::debug;

use crate::chatbot::completion::{BackendError, CompletionBackend, CompletionRequest};
use crate::chatbot::voice::Transcriber;

pub struct Client {
    api_key: String,
    base_url: String,
    transcription_model: String,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

impl Client {
    pub fn new(api_key: String, base_url: String, transcription_model: String) -> Self {
        Self {
            api_key,
            base_url,
            transcription_model,
            http: reqwest::Client::new(),
        }
    }

    async fn read_body(response: reqwest::Response) -> Result<String, BackendError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Http(e.to_string()))?;
        debug!("Backend response {status}: {body}");

        if !status.is_success() {
            return Err(BackendError::Api { status: status.as_u16(), body });
        }
        Ok(body)
    }
}

#[async_trait]
impl CompletionBackend for Client {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError> {
        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| BackendError::Http(e.to_string()))?;

        parse_completion(&Self::read_body(response).await?)
    }
}

#[async_trait]
impl Transcriber for Client {
    async fn transcribe(&self, wav: Vec<u8>) -> Result<String, BackendError> {
        let file = Part::bytes(wav)
            .file_name("speech.wav")
            .mime_str("audio/wav")
            .map_err(|e| BackendError::Http(e.to_string()))?;
        let form = Form::new()
            .text("model", self.transcription_model.clone())
            .part("file", file);

        let response = self
            .http
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| BackendError::Http(e.to_string()))?;

        parse_transcription(&Self::read_body(response).await?)
    }
}

fn parse_completion(body: &str) -> Result<String, BackendError> {
    let parsed: CompletionResponse =
        serde_json::from_str(body).map_err(|e| BackendError::Parse(e.to_string()))?;
    parsed
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or(BackendError::Empty)
}

fn parse_transcription(body: &str) -> Result<String, BackendError> {
    let parsed: TranscriptionResponse =
        serde_json::from_str(body).map_err(|e| BackendError::Parse(e.to_string()))?;
    Ok(parsed.text)
}
