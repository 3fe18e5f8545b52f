//! Command Handler module for the slash commands

use anyhow::Result;
use teloxide::types::{BotCommand, UserId};
use tracing::info;

use crate::localization::t_lang;
use crate::transport::{ReplyMarkupKind, SendOptions};

use super::dialogue_manager::start_subject_prompt;
use super::message_handler::IncomingMessage;
use super::ui_builder::{format_history, split_message, TELEGRAM_MESSAGE_LIMIT};
use super::BotContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    About,
    Menu,
    Subject,
    History,
    Clear,
}

impl Command {
    pub const ALL: [Command; 6] = [
        Command::Start,
        Command::About,
        Command::Menu,
        Command::Subject,
        Command::History,
        Command::Clear,
    ];

    /// Parse the first token of a message: `/start`, `/Start`, `/start@my_bot`.
    /// Anything after the command is ignored.
    pub fn parse(text: &str) -> Option<Self> {
        let token = text.split_whitespace().next()?;
        let name = token.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name);

        match name.to_lowercase().as_str() {
            "start" => Some(Command::Start),
            "about" => Some(Command::About),
            "menu" => Some(Command::Menu),
            "subject" => Some(Command::Subject),
            "history" => Some(Command::History),
            "clear" => Some(Command::Clear),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Start => "/start",
            Command::About => "/about",
            Command::Menu => "/menu",
            Command::Subject => "/subject",
            Command::History => "/history",
            Command::Clear => "/clear",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Command::Start => "Restart the bot",
            Command::About => "Learn more about the bot",
            Command::Menu => "Show available options",
            Command::Subject => "Set the subject of your questions",
            Command::History => "Show your recent answers",
            Command::Clear => "Clear your answer history",
        }
    }

    /// Command list registered with Telegram at startup
    pub fn bot_commands() -> Vec<BotCommand> {
        Self::ALL
            .iter()
            .map(|command| BotCommand::new(&command.as_str()[1..], command.description()))
            .collect()
    }
}

pub async fn handle_command(
    ctx: &BotContext,
    msg: &IncomingMessage,
    user: UserId,
    command: Command,
) -> Result<()> {
    info!(user_id = user.0, command = command.as_str(), "Command triggered");
    let language_code = msg.language_code.as_deref();

    match command {
        Command::Start => send_with_menu(ctx, msg, &t_lang("welcome", language_code)).await,
        Command::About => send_with_menu(ctx, msg, &t_lang("about", language_code)).await,
        Command::Menu => send_with_menu(ctx, msg, &t_lang("menu", language_code)).await,
        Command::Subject => start_subject_prompt(ctx, msg, user).await,
        Command::History => {
            let history = ctx.sessions.history(user);
            let text = format_history(&history, language_code);
            for part in split_message(&text, TELEGRAM_MESSAGE_LIMIT) {
                ctx.transport
                    .send_text(msg.chat_id, &part, SendOptions::plain())
                    .await?;
            }
            Ok(())
        }
        Command::Clear => {
            ctx.sessions.clear_history(user);
            ctx.transport
                .send_text(
                    msg.chat_id,
                    &t_lang("history-cleared", language_code),
                    SendOptions::plain(),
                )
                .await?;
            Ok(())
        }
    }
}

async fn send_with_menu(ctx: &BotContext, msg: &IncomingMessage, text: &str) -> Result<()> {
    ctx.transport
        .send_text(
            msg.chat_id,
            text,
            SendOptions::with_markup(ReplyMarkupKind::MenuKeyboard),
        )
        .await?;
    Ok(())
}
