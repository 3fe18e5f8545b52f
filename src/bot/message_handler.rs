//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::MessageId;
use tracing::{debug, error};

use crate::localization::t_lang;
use crate::pipeline::{select_largest, PhotoRequest, PhotoVariant};
use crate::transport::SendOptions;

use super::command_handler::{handle_command, Command};
use super::dialogue_manager::handle_subject_reply;
use super::BotContext;

/// The parts of a Telegram message the bot acts on
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    /// Absent for channel posts
    pub user_id: Option<UserId>,
    pub language_code: Option<String>,
    pub text: Option<String>,
    /// Id of the message this one replies to
    pub reply_to: Option<MessageId>,
    pub photos: Vec<PhotoVariant>,
}

impl IncomingMessage {
    pub fn from_message(msg: &Message) -> Self {
        Self {
            chat_id: msg.chat.id,
            message_id: msg.id,
            user_id: msg.from.as_ref().map(|user| user.id),
            language_code: msg
                .from
                .as_ref()
                .and_then(|user| user.language_code.clone()),
            text: msg.text().map(str::to_string),
            reply_to: msg.reply_to_message().map(|reply| reply.id),
            photos: msg
                .photo()
                .map(|sizes| sizes.iter().map(PhotoVariant::from).collect())
                .unwrap_or_default(),
        }
    }
}

/// Dispatcher endpoint for message updates
pub async fn message_handler(msg: Message, ctx: Arc<BotContext>) -> Result<()> {
    route_message(&ctx, IncomingMessage::from_message(&msg)).await
}

pub async fn route_message(ctx: &Arc<BotContext>, msg: IncomingMessage) -> Result<()> {
    let Some(user) = msg.user_id else {
        debug!(chat_id = %msg.chat_id, "Ignoring message without sender");
        return Ok(());
    };

    if !msg.photos.is_empty() {
        handle_photo_message(ctx, &msg, user);
        return Ok(());
    }

    let Some(text) = msg.text.as_deref() else {
        debug!(user_id = user.0, "Ignoring unsupported message type");
        return Ok(());
    };

    if let Some(command) = Command::parse(text) {
        return handle_command(ctx, &msg, user, command).await;
    }

    if let Some(reply_to) = msg.reply_to {
        if ctx.prompts.take(user, msg.chat_id, reply_to) {
            return handle_subject_reply(ctx, &msg, user, text).await;
        }
    }

    debug!(user_id = user.0, message_length = text.len(), "Received text message from user");
    ctx.transport
        .send_text(
            msg.chat_id,
            &t_lang("text-tip", msg.language_code.as_deref()),
            SendOptions::plain(),
        )
        .await?;
    Ok(())
}

/// Answer the photo on its own task so the chat stays responsive
fn handle_photo_message(ctx: &Arc<BotContext>, msg: &IncomingMessage, user: UserId) {
    let Some(photo) = select_largest(&msg.photos) else {
        return;
    };

    let request = PhotoRequest {
        chat_id: msg.chat_id,
        message_id: msg.message_id,
        user_id: user,
        photo: photo.clone(),
    };
    let pipeline = Arc::clone(&ctx.pipeline);

    tokio::spawn(async move {
        if let Err(e) = pipeline.handle(&request).await {
            error!(user_id = request.user_id.0, error = %e, "Failed to send error reply");
        }
    });
}
