//! Messaging transport: the narrow slice of the Telegram API the bot uses.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{FileId, ForceReply, MessageId, ReplyParameters};
use thiserror::Error;
use tracing::debug;

use crate::bot::ui_builder::menu_keyboard;

/// Errors raised by the transport collaborator
#[derive(Debug, Error)]
pub enum TransportError {
    /// Telegram Bot API call failed
    #[error(transparent)]
    Telegram(#[from] teloxide::RequestError),
    /// File download over HTTP failed; the request URL (which embeds the
    /// bot token) is stripped before the error is stored
    #[error(transparent)]
    Download(reqwest::Error),
    #[error("{0}")]
    Other(String),
}

/// Markup attached to an outgoing message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReplyMarkupKind {
    #[default]
    None,
    /// Reply keyboard listing every command
    MenuKeyboard,
    /// Ask the client to open a reply to this message
    ForceReply,
}

/// How an outgoing message is presented
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendOptions {
    /// Thread the message as a reply to this one
    pub reply_to: Option<MessageId>,
    pub markup: ReplyMarkupKind,
}

impl SendOptions {
    pub fn plain() -> Self {
        Self::default()
    }

    pub fn reply_to(message_id: MessageId) -> Self {
        Self {
            reply_to: Some(message_id),
            markup: ReplyMarkupKind::None,
        }
    }

    pub fn with_markup(markup: ReplyMarkupKind) -> Self {
        Self {
            reply_to: None,
            markup,
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Resolve a file reference and download its bytes
    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, TransportError>;

    /// Send a text message, returning the id of the sent message
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        options: SendOptions,
    ) -> Result<MessageId, TransportError>;
}

/// Telegram Bot API transport
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
    http: reqwest::Client,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self {
            bot,
            http: reqwest::Client::new(),
        }
    }
}

/// GET `url` and return the body. Errors never carry the URL.
pub async fn fetch_bytes(http: &reqwest::Client, url: &str) -> Result<Vec<u8>, TransportError> {
    let redact = |e: reqwest::Error| TransportError::Download(e.without_url());

    let response = http
        .get(url)
        .send()
        .await
        .map_err(redact)?
        .error_for_status()
        .map_err(redact)?;
    let bytes = response.bytes().await.map_err(redact)?;
    Ok(bytes.to_vec())
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, TransportError> {
        let file = self.bot.get_file(FileId(file_id.to_string())).await?;
        let url = format!(
            "https://api.telegram.org/file/bot{}/{}",
            self.bot.token(),
            file.path
        );

        debug!(file_id = %file_id, "Downloading file");
        fetch_bytes(&self.http, &url).await
    }

    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        options: SendOptions,
    ) -> Result<MessageId, TransportError> {
        let mut request = self.bot.send_message(chat_id, text);
        if let Some(reply_to) = options.reply_to {
            request = request.reply_parameters(ReplyParameters::new(reply_to));
        }
        request = match options.markup {
            ReplyMarkupKind::None => request,
            ReplyMarkupKind::MenuKeyboard => request.reply_markup(menu_keyboard()),
            ReplyMarkupKind::ForceReply => request.reply_markup(ForceReply::new()),
        };

        let sent = request.await?;
        Ok(sent.id)
    }
}
