use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config file.
    #[error("failed to read config file '{}': {source}", .path.display())]
    ReadFile { path: PathBuf, source: std::io::Error },
    /// Failed to parse JSON.
    #[error("failed to parse config file '{}': {source}", .path.display())]
    ParseJson { path: PathBuf, source: serde_json::Error },
    /// A mandatory setting is absent.
    #[error("{0} is not set")]
    Missing(&'static str),
    /// An environment value could not be parsed.
    #[error("invalid value for {name}: '{value}'")]
    InvalidValue { name: &'static str, value: String },
    /// Validation error.
    #[error("config validation error: {0}")]
    Validation(String),
}

const DEFAULT_BOT_NAME: &str = "ChatGPT bot";
const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";
const DEFAULT_HISTORY_SIZE: usize = 20;

#[derive(Deserialize)]
struct ConfigFile {
    telegram_bot_token: String,
    openai_api_key: String,
    #[serde(default = "default_bot_name")]
    bot_name: String,
    #[serde(default = "default_openai_url")]
    openai_url: String,
    #[serde(default = "default_model")]
    model: String,
    #[serde(default = "default_sampling")]
    temperature: f64,
    #[serde(default = "default_sampling")]
    top_p: f64,
    /// Usernames allowed to talk to the bot. Empty allows everyone.
    #[serde(default)]
    whitelist: Vec<String>,
    /// Fixed "system" message prepended to every prompt.
    system_prompt: Option<String>,
    #[serde(default = "default_history_size")]
    history_size: usize,
    #[serde(default = "default_transcription_model")]
    transcription_model: String,
    ffmpeg_path: Option<String>,
    /// Directory for state files (logs). Defaults to current directory.
    data_dir: Option<String>,
}

fn default_bot_name() -> String {
    DEFAULT_BOT_NAME.to_string()
}

fn default_openai_url() -> String {
    DEFAULT_OPENAI_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_sampling() -> f64 {
    1.0
}

fn default_history_size() -> usize {
    DEFAULT_HISTORY_SIZE
}

fn default_transcription_model() -> String {
    DEFAULT_TRANSCRIPTION_MODEL.to_string()
}

/// Process-wide settings, read once at startup and never mutated.
#[derive(Clone, Serialize)]
pub struct Config {
    pub telegram_bot_token: String,
    pub bot_name: String,
    pub openai_api_key: String,
    pub openai_url: String,
    pub model: String,
    pub temperature: f64,
    pub top_p: f64,
    pub whitelist: Vec<String>,
    pub system_prompt: Option<String>,
    /// Maximum number of stored messages per chat.
    pub history_size: usize,
    pub transcription_model: String,
    pub ffmpeg_path: PathBuf,
    pub data_dir: PathBuf,
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config_path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| ConfigError::ReadFile { path: config_path.clone(), source: e })?;
        let file: ConfigFile = serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseJson { path: config_path, source: e })?;
        Self::from_file(file)
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an environment-like lookup.
    ///
    /// Recognized variables: `TG_APIKEY`, `OPENAI_APIKEY` (both mandatory),
    /// `BOT_NAME`, `OPENAI_URL`, `OPENAI_MODEL_NAME`, `OPENAI_TEMPERATURE`,
    /// `OPENAI_TOP_P`, `WHITELIST` (comma separated), `CHAT_GPT_PROMPT`,
    /// `CHAT_HISTORY_SIZE`, `TRANSCRIPTION_MODEL`, `FFMPEG_PATH`, `DATA_DIR`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let file = ConfigFile {
            telegram_bot_token: lookup("TG_APIKEY").ok_or(ConfigError::Missing("TG_APIKEY"))?,
            openai_api_key: lookup("OPENAI_APIKEY").ok_or(ConfigError::Missing("OPENAI_APIKEY"))?,
            bot_name: non_blank("BOT_NAME").unwrap_or_else(default_bot_name),
            openai_url: non_blank("OPENAI_URL").unwrap_or_else(default_openai_url),
            model: non_blank("OPENAI_MODEL_NAME").unwrap_or_else(default_model),
            temperature: parse_env("OPENAI_TEMPERATURE", non_blank("OPENAI_TEMPERATURE"))?
                .unwrap_or_else(default_sampling),
            top_p: parse_env("OPENAI_TOP_P", non_blank("OPENAI_TOP_P"))?
                .unwrap_or_else(default_sampling),
            whitelist: non_blank("WHITELIST")
                .map(|list| split_whitelist(&list))
                .unwrap_or_default(),
            system_prompt: non_blank("CHAT_GPT_PROMPT"),
            history_size: parse_env("CHAT_HISTORY_SIZE", non_blank("CHAT_HISTORY_SIZE"))?
                .unwrap_or_else(default_history_size),
            transcription_model: non_blank("TRANSCRIPTION_MODEL")
                .unwrap_or_else(default_transcription_model),
            ffmpeg_path: non_blank("FFMPEG_PATH"),
            data_dir: non_blank("DATA_DIR"),
        };
        Self::from_file(file)
    }

    fn from_file(file: ConfigFile) -> Result<Self, ConfigError> {
        if file.telegram_bot_token.is_empty() {
            return Err(ConfigError::Validation("telegram_bot_token is required".into()));
        }
        // Telegram tokens are formatted as {bot_id}:{secret} where bot_id is numeric
        let valid_token = file
            .telegram_bot_token
            .split_once(':')
            .is_some_and(|(id, secret)| id.parse::<u64>().is_ok() && !secret.is_empty());
        if !valid_token {
            return Err(ConfigError::Validation(
                "telegram_bot_token appears invalid (expected format: 123456789:ABCdefGHI...)".into(),
            ));
        }
        if file.openai_api_key.is_empty() {
            return Err(ConfigError::Validation("openai_api_key is required".into()));
        }
        if file.history_size == 0 {
            return Err(ConfigError::Validation("history_size must be positive".into()));
        }
        if !(0.0..=2.0).contains(&file.temperature) {
            return Err(ConfigError::Validation("temperature must be within [0, 2]".into()));
        }
        if !(0.0..=1.0).contains(&file.top_p) {
            return Err(ConfigError::Validation("top_p must be within [0, 1]".into()));
        }

        let whitelist = file
            .whitelist
            .into_iter()
            .map(|name| name.trim().trim_start_matches('@').to_string())
            .filter(|name| !name.is_empty())
            .collect();

        Ok(Self {
            telegram_bot_token: file.telegram_bot_token,
            bot_name: file.bot_name,
            openai_api_key: file.openai_api_key,
            openai_url: file.openai_url.trim_end_matches('/').to_string(),
            model: file.model,
            temperature: file.temperature,
            top_p: file.top_p,
            whitelist,
            system_prompt: file.system_prompt.filter(|p| !p.trim().is_empty()),
            history_size: file.history_size,
            transcription_model: file.transcription_model,
            ffmpeg_path: file
                .ffmpeg_path
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("ffmpeg")),
            data_dir: file
                .data_dir
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
        })
    }

    /// Pretty JSON rendering with secrets cut down to a short prefix.
    pub fn redacted(&self) -> String {
        let mut shown = self.clone();
        shown.telegram_bot_token = mask_secret(&self.telegram_bot_token);
        shown.openai_api_key = mask_secret(&self.openai_api_key);
        serde_json::to_string_pretty(&shown).unwrap_or_default()
    }
}

fn mask_secret(secret: &str) -> String {
    let prefix: String = secret.chars().take(5).collect();
    format!("{prefix}***")
}

fn parse_env<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
) -> Result<Option<T>, ConfigError> {
    value
        .map(|v| {
            v.trim()
                .parse::<T>()
                .map_err(|_| ConfigError::InvalidValue { name, value: v.clone() })
        })
        .transpose()
}

fn split_whitelist(list: &str) -> Vec<String> {
    match Regex::new(r"\s*,\s*") {
        Ok(separator) => separator
            .split(list.trim())
            .map(str::to_string)
            .collect(),
        Err(_) => list.split(',').map(|s| s.trim().to_string()).collect(),
    }
}
