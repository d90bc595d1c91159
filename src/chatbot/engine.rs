//! Chatbot engine - relays chat messages to the completion backend.
//!
//! Every inbound message runs the same fixed pipeline:
//! access check → routing → (voice transcription →) completion →
//! history update → delivery.

use std::sync::Arc;

use tracing::{info, warn};

use crate::chatbot::access::is_authorized;
use crate::chatbot::commands::{route, Command, Route, CLEARED_REPLY, INTRODUCTION_PROMPT};
use crate::chatbot::completion::{Completer, CompletionBackend, ModelParams};
use crate::chatbot::delivery::{Delivery, Transport};
use crate::chatbot::message::{Content, IncomingMessage, Sender};
use crate::chatbot::session::SessionStore;
use crate::chatbot::voice::{AudioConverter, Transcriber, VoicePipeline};
use crate::config::Config;

/// External services the engine depends on.
pub struct Collaborators {
    pub transport: Arc<dyn Transport>,
    pub completion: Arc<dyn CompletionBackend>,
    pub converter: Arc<dyn AudioConverter>,
    pub transcriber: Arc<dyn Transcriber>,
}

/// The chatbot engine.
pub struct ChatbotEngine {
    config: Config,
    /// Telegram username of the bot, used to match `/cmd@bot`.
    bot_username: String,
    sessions: SessionStore,
    completer: Completer,
    voice: VoicePipeline,
    delivery: Delivery,
}

impl ChatbotEngine {
    pub fn new(config: Config, bot_username: String, collaborators: Collaborators) -> Self {
        let sessions = SessionStore::new(config.history_size, config.system_prompt.clone());
        let completer = Completer::new(
            collaborators.completion,
            ModelParams {
                model: config.model.clone(),
                temperature: config.temperature,
                top_p: config.top_p,
            },
        );
        let voice = VoicePipeline::new(
            collaborators.transport.clone(),
            collaborators.converter,
            collaborators.transcriber,
        );
        let delivery = Delivery::new(collaborators.transport);

        Self {
            config,
            bot_username,
            sessions,
            completer,
            voice,
            delivery,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Handle an incoming message.
    pub async fn handle_message(&self, msg: IncomingMessage) {
        if !is_authorized(&self.config.whitelist, &msg.sender) {
            info!(
                "Ignoring message from {}, since they are not in the whitelist",
                msg.sender.display()
            );
            return;
        }

        match msg.content {
            Content::Text(ref text) => match route(text, &self.bot_username) {
                Route::Command(command) => self.handle_command(&msg, command).await,
                Route::Unknown(command) => {
                    info!("Unknown command from {}: {}", msg.sender.display(), command);
                }
                Route::Conversation => {
                    self.handle_conversation(msg.chat_id, &msg.sender, text).await;
                }
            },
            Content::Voice { ref file_id } => self.handle_voice(&msg, file_id).await,
        }
    }

    async fn handle_command(&self, msg: &IncomingMessage, command: Command) {
        let chat_id = msg.chat_id;
        match command {
            Command::Clean => {
                info!("Cleaning chat history for {}", msg.sender.display());
                self.sessions.clear(chat_id);
                let _ = self.delivery.deliver(chat_id, CLEARED_REPLY, None).await;
            }
            Command::Config => {
                info!("Responding with config to {}", msg.sender.display());
                let _ = self.delivery.deliver(chat_id, &self.config.redacted(), None).await;
            }
            Command::Start => {
                info!("Responding with introduction message to {}", msg.sender.display());
                self.handle_conversation(chat_id, &msg.sender, INTRODUCTION_PROMPT).await;
            }
        }
    }

    /// Ask the backend, record the turn, send the reply.
    ///
    /// The turn is recorded even when the reply is the failure sentinel, and
    /// before delivery, so a failed send leaves the history updated.
    async fn handle_conversation(&self, chat_id: i64, sender: &Sender, text: &str) {
        info!(
            "📨 {} in chat {}: \"{}\"",
            sender.display(),
            chat_id,
            text.chars().take(50).collect::<String>()
        );

        let prompt = self.sessions.assemble_prompt(chat_id, text);
        let reply = self.completer.complete(chat_id, prompt).await;
        self.sessions.record_turn(chat_id, text, &reply);

        let _ = self.delivery.deliver(chat_id, &reply, None).await;
    }

    async fn handle_voice(&self, msg: &IncomingMessage, file_id: &str) {
        info!("🎤 Voice message from {} in chat {}", msg.sender.display(), msg.chat_id);

        let transcript = match self.voice.transcribe(msg.chat_id, file_id).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Voice message in chat {} abandoned: {e}", msg.chat_id);
                return;
            }
        };
        if transcript.trim().is_empty() {
            info!("Empty transcription in chat {}, nothing to answer", msg.chat_id);
            return;
        }

        // Show the user what was understood, then answer it as typed text.
        let _ = self
            .delivery
            .deliver(msg.chat_id, &transcript, Some(msg.message_id))
            .await;
        self.handle_conversation(msg.chat_id, &msg.sender, &transcript).await;
    }
}
