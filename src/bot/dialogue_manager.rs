//! Dialogue Manager module for the `/subject` prompt and its reply

use anyhow::Result;
use teloxide::types::UserId;
use tracing::{debug, info};

use crate::dialogue::{validate_subject, SubjectRejection};
use crate::localization::{t_args_lang, t_lang};
use crate::transport::{ReplyMarkupKind, SendOptions};

use super::message_handler::IncomingMessage;
use super::BotContext;

/// Send the subject prompt and remember it until answered or expired
pub async fn start_subject_prompt(ctx: &BotContext, msg: &IncomingMessage, user: UserId) -> Result<()> {
    let prompt_id = ctx
        .transport
        .send_text(
            msg.chat_id,
            &t_lang("subject-prompt", msg.language_code.as_deref()),
            SendOptions::with_markup(ReplyMarkupKind::ForceReply),
        )
        .await?;

    ctx.prompts.register(user, msg.chat_id, prompt_id);
    debug!(user_id = user.0, prompt_id = prompt_id.0, "Subject prompt registered");
    Ok(())
}

/// Handle the text that answered a pending subject prompt
pub async fn handle_subject_reply(
    ctx: &BotContext,
    msg: &IncomingMessage,
    user: UserId,
    text: &str,
) -> Result<()> {
    let language_code = msg.language_code.as_deref();

    let reply = match validate_subject(text) {
        Ok(subject) => {
            info!(user_id = user.0, subject = %subject, "Subject set");
            let confirmation = t_args_lang("subject-set", &[("subject", subject.as_str())], language_code);
            ctx.sessions.set_subject(user, subject);
            confirmation
        }
        Err(SubjectRejection::Empty) => t_lang("subject-unchanged", language_code),
        Err(SubjectRejection::TooLong) => t_lang("subject-too-long", language_code),
    };

    ctx.transport
        .send_text(msg.chat_id, &reply, SendOptions::plain())
        .await?;
    Ok(())
}
