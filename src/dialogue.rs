//! Subject dialogue: outstanding `/subject` prompts awaiting a reply.
//!
//! A prompt is keyed by the user, the chat and the id of the prompt message
//! itself, so only a reply to that exact message completes it. Message ids
//! are only unique within a chat. Records expire after a
//! TTL and the registry holds at most `capacity` of them.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use teloxide::types::{ChatId, MessageId, UserId};
use tracing::debug;

/// Longest subject accepted, in characters
pub const MAX_SUBJECT_CHARS: usize = 100;

pub const DEFAULT_PROMPT_TTL: Duration = Duration::from_secs(600);
pub const DEFAULT_MAX_PENDING: usize = 1000;

/// Why a reply was not accepted as a subject
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectRejection {
    Empty,
    TooLong,
}

/// Validates a subject reply, returning it trimmed
pub fn validate_subject(input: &str) -> Result<String, SubjectRejection> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(SubjectRejection::Empty);
    }

    if trimmed.chars().count() > MAX_SUBJECT_CHARS {
        return Err(SubjectRejection::TooLong);
    }

    Ok(trimmed.to_string())
}

type PromptKey = (UserId, ChatId, MessageId);

/// Registry of `/subject` prompts that have not been answered yet
#[derive(Debug)]
pub struct PendingSubjectPrompts {
    prompts: Mutex<HashMap<PromptKey, Instant>>,
    ttl: Duration,
    capacity: usize,
}

impl PendingSubjectPrompts {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            prompts: Mutex::new(HashMap::new()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Remember that `prompt` was sent to `user` in `chat`
    pub fn register(&self, user: UserId, chat: ChatId, prompt: MessageId) {
        self.register_at(user, chat, prompt, Instant::now());
    }

    /// Complete the prompt `reply_to` if it is pending for `user` in `chat`.
    ///
    /// Returns `true` at most once per registered prompt.
    pub fn take(&self, user: UserId, chat: ChatId, reply_to: MessageId) -> bool {
        self.take_at(user, chat, reply_to, Instant::now())
    }

    pub fn register_at(&self, user: UserId, chat: ChatId, prompt: MessageId, now: Instant) {
        let mut prompts = self.prompts.lock().unwrap_or_else(PoisonError::into_inner);
        self.purge_expired(&mut prompts, now);

        while prompts.len() >= self.capacity {
            let oldest = prompts
                .iter()
                .min_by_key(|(_, created)| **created)
                .map(|(key, _)| *key);
            match oldest {
                Some(key) => {
                    debug!(user_id = key.0.0, chat_id = key.1.0, prompt_id = key.2.0, "Evicting oldest pending subject prompt");
                    prompts.remove(&key);
                }
                None => break,
            }
        }

        prompts.insert((user, chat, prompt), now);
    }

    pub fn take_at(&self, user: UserId, chat: ChatId, reply_to: MessageId, now: Instant) -> bool {
        let mut prompts = self.prompts.lock().unwrap_or_else(PoisonError::into_inner);
        self.purge_expired(&mut prompts, now);
        prompts.remove(&(user, chat, reply_to)).is_some()
    }

    pub fn len(&self) -> usize {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn purge_expired(&self, prompts: &mut HashMap<PromptKey, Instant>, now: Instant) {
        let before = prompts.len();
        prompts.retain(|_, created| now.saturating_duration_since(*created) < self.ttl);
        let expired = before - prompts.len();
        if expired > 0 {
            debug!(expired, "Purged expired subject prompts");
        }
    }
}

impl Default for PendingSubjectPrompts {
    fn default() -> Self {
        Self::new(DEFAULT_PROMPT_TTL, DEFAULT_MAX_PENDING)
    }
}
