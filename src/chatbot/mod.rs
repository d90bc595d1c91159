//! Chatbot module - relays Telegram messages to an OpenAI-compatible backend.

pub mod access;
pub mod commands;
pub mod completion;
pub mod converter;
pub mod delivery;
pub mod engine;
pub mod message;
pub mod session;
pub mod telegram;
pub mod voice;


pub use commands::Command;
pub use converter::FfmpegConverter;
pub use engine::{ChatbotEngine, Collaborators};
pub use message::{Content, IncomingMessage, Sender};
pub use telegram::TelegramClient;
