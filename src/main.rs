use anyhow::{Context, Result};
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mcq_solver_bot::answer::OpenAiAnswerGenerator;
use mcq_solver_bot::bot::{message_handler, BotContext, Command};
use mcq_solver_bot::config::BotConfig;
use mcq_solver_bot::dialogue::PendingSubjectPrompts;
use mcq_solver_bot::instance_manager::OcrInstanceManager;
use mcq_solver_bot::localization::init_localization;
use mcq_solver_bot::ocr::TesseractExtractor;
use mcq_solver_bot::pipeline::AnswerPipeline;
use mcq_solver_bot::session::InMemorySessionStore;
use mcq_solver_bot::transport::TelegramTransport;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_tracing();
    info!("Starting MCQ Solver Telegram Bot");

    init_localization().context("Failed to load localization resources")?;

    let config = BotConfig::from_env().context("Invalid configuration")?;
    info!(config = ?config, "Configuration loaded");
    if config.openai_api_key.is_none() {
        warn!("OPENAI_API_KEY is not set, answer generation will fail until it is provided");
    }

    let bot = Bot::new(config.telegram_token.clone());

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!(error = %e, "Failed to register bot commands");
    }

    let ctx = Arc::new(build_context(bot.clone(), &config));

    info!("Bot initialized, starting dispatcher");

    let handler = dptree::entry().branch(Update::filter_message().endpoint(message_handler));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![ctx])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

fn build_context(bot: Bot, config: &BotConfig) -> BotContext {
    let transport = Arc::new(TelegramTransport::new(bot));
    let sessions = Arc::new(InMemorySessionStore::new());
    let extractor = Arc::new(TesseractExtractor::new(
        config.ocr_config(),
        Arc::new(OcrInstanceManager::new()),
    ));
    let generator = Arc::new(OpenAiAnswerGenerator::new(
        config.openai_api_key.as_deref(),
        config.openai_base_url.as_deref(),
        config.model.clone(),
    ));

    let pipeline = Arc::new(AnswerPipeline::new(
        transport.clone(),
        extractor,
        generator,
        sessions.clone(),
        config.pipeline_settings(),
    ));

    BotContext {
        transport,
        sessions,
        prompts: Arc::new(PendingSubjectPrompts::new(
            config.subject_prompt_ttl,
            config.max_pending_prompts,
        )),
        pipeline,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,mcq_solver_bot=debug"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
