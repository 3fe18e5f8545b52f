//! Per-user session state: the tracked subject and a capped answer history.
//!
//! Handlers depend on the [`SessionStore`] trait; [`InMemorySessionStore`]
//! is the process-lifetime implementation.

use chrono::{DateTime, Local};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use teloxide::types::UserId;

/// Maximum number of answers kept per user
pub const HISTORY_LIMIT: usize = 10;

/// One generated answer, stamped with its capture time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// Locale-formatted local time of generation
    pub timestamp: String,
    /// Full generated answer body
    pub text: String,
}

impl AnswerRecord {
    pub fn new(timestamp: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            text: text.into(),
        }
    }

    /// Record stamped with the current local time
    pub fn now(text: impl Into<String>) -> Self {
        Self::new(format_timestamp(&Local::now()), text)
    }
}

/// `10/19/2026, 04:42:00 PM`
pub fn format_timestamp(at: &DateTime<Local>) -> String {
    at.format("%m/%d/%Y, %I:%M:%S %p").to_string()
}

/// State held for one user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub subject: Option<String>,
    pub history: Vec<AnswerRecord>,
}

impl UserSession {
    /// Append and keep only the most recent [`HISTORY_LIMIT`] entries
    pub fn push_answer(&mut self, record: AnswerRecord) {
        self.history.push(record);
        if self.history.len() > HISTORY_LIMIT {
            let excess = self.history.len() - HISTORY_LIMIT;
            self.history.drain(..excess);
        }
    }
}

/// Storage for per-user sessions.
///
/// Every operation touches exactly one user's entry. Sessions are created
/// lazily by `set_subject` and `append_history`; nothing deletes them.
pub trait SessionStore: Send + Sync {
    fn subject(&self, user: UserId) -> Option<String>;

    /// Overwrite the subject, creating the session if needed
    fn set_subject(&self, user: UserId, subject: String);

    /// Oldest first; empty when the user has no answers
    fn history(&self, user: UserId) -> Vec<AnswerRecord>;

    fn append_history(&self, user: UserId, record: AnswerRecord);

    /// Remove all answers; the subject is kept
    fn clear_history(&self, user: UserId);
}

/// Process-lifetime session store
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<UserId, UserSession>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

impl SessionStore for InMemorySessionStore {
    fn subject(&self, user: UserId) -> Option<String> {
        self.sessions
            .get(&user)
            .and_then(|session| session.subject.clone())
    }

    fn set_subject(&self, user: UserId, subject: String) {
        self.sessions.entry(user).or_default().subject = Some(subject);
    }

    fn history(&self, user: UserId) -> Vec<AnswerRecord> {
        self.sessions
            .get(&user)
            .map(|session| session.history.clone())
            .unwrap_or_default()
    }

    fn append_history(&self, user: UserId, record: AnswerRecord) {
        self.sessions.entry(user).or_default().push_answer(record);
    }

    fn clear_history(&self, user: UserId) {
        if let Some(mut session) = self.sessions.get_mut(&user) {
            session.history.clear();
        }
    }
}
