//! Bot module for handling Telegram interactions
//!
//! - `message_handler`: converts updates and routes them
//! - `command_handler`: slash commands
//! - `dialogue_manager`: the `/subject` prompt and its reply
//! - `ui_builder`: keyboards and message formatting

pub mod command_handler;
pub mod dialogue_manager;
pub mod message_handler;
pub mod ui_builder;

use std::sync::Arc;

use crate::dialogue::PendingSubjectPrompts;
use crate::pipeline::AnswerPipeline;
use crate::session::SessionStore;
use crate::transport::Transport;

pub use command_handler::Command;
pub use message_handler::{message_handler, route_message, IncomingMessage};

/// Shared services injected into every handler
pub struct BotContext {
    pub transport: Arc<dyn Transport>,
    pub sessions: Arc<dyn SessionStore>,
    pub prompts: Arc<PendingSubjectPrompts>,
    pub pipeline: Arc<AnswerPipeline>,
}
