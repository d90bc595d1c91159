use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{debug, info, warn};
use tracing_subscriber::prelude::*;

use chatgpt_relay::chatbot::{
    ChatbotEngine, Collaborators, Command, Content, FfmpegConverter, IncomingMessage, Sender,
    TelegramClient,
};
use chatgpt_relay::config::Config;
use chatgpt_relay::openai::Client as OpenAiClient;

#[tokio::main]
async fn main() {
    // A config file path wins; otherwise settings come from the environment.
    let loaded = match std::env::args().nth(1) {
        Some(path) => Config::load(&path),
        None => Config::from_env(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Setup logging
    let log_dir = config.data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).ok();
    let log_file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("chatgpt-relay.log"))
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to open log file in {}: {e}", log_dir.display());
            std::process::exit(1);
        }
    };
    let (non_blocking, _guard) = tracing_appender::non_blocking(log_file);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .init();

    info!("🚀 Starting {}", config.bot_name);
    info!("Configuration: {}", config.redacted());

    let bot = Bot::new(&config.telegram_bot_token);

    let bot_username = match bot.get_me().await {
        Ok(me) => {
            info!("Bot user ID: {}, username: @{}", me.id, me.username());
            me.username().to_string()
        }
        Err(e) => {
            warn!("Failed to get bot info: {e}");
            String::new()
        }
    };

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!("Failed to register bot commands: {e}");
    }

    let openai = Arc::new(OpenAiClient::new(
        config.openai_api_key.clone(),
        config.openai_url.clone(),
        config.transcription_model.clone(),
    ));
    let collaborators = Collaborators {
        transport: Arc::new(TelegramClient::new(bot.clone())),
        completion: openai.clone(),
        converter: Arc::new(FfmpegConverter::new(config.ffmpeg_path.clone())),
        transcriber: openai,
    };
    let engine = Arc::new(ChatbotEngine::new(config, bot_username, collaborators));

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handle_new_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![engine])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

/// Hand the message to the engine on its own task; the dispatcher never
/// waits for a backend call.
async fn handle_new_message(msg: Message, engine: Arc<ChatbotEngine>) -> ResponseResult<()> {
    let Some(incoming) = telegram_to_incoming(&msg) else {
        debug!("Skipping message {} in chat {}: nothing to handle", msg.id.0, msg.chat.id.0);
        return Ok(());
    };

    tokio::spawn(async move {
        engine.handle_message(incoming).await;
    });
    Ok(())
}

fn telegram_to_incoming(msg: &Message) -> Option<IncomingMessage> {
    let user = msg.from.as_ref()?;
    let sender = Sender {
        user_id: user.id.0 as i64,
        username: user.username.clone(),
    };

    let content = if let Some(text) = msg.text() {
        Content::Text(text.to_string())
    } else if let Some(voice) = msg.voice() {
        Content::Voice { file_id: voice.file.id.0.clone() }
    } else {
        return None;
    };

    Some(IncomingMessage {
        chat_id: msg.chat.id.0,
        message_id: msg.id.0 as i64,
        sender,
        content,
    })
}
