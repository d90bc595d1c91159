//! Telegram bot that relays chats to an OpenAI-compatible chat backend,
//! keeping a short rolling history per chat.

pub mod chatbot;
pub mod config;
pub mod openai;
