//! UI Builder module for creating keyboards and formatting messages

use teloxide::types::{KeyboardButton, KeyboardMarkup};

use crate::localization::{t_args_lang, t_lang};
use crate::session::AnswerRecord;

use super::command_handler::Command;

/// Telegram's official limit is 4096; the margin keeps split points safe
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4000;

/// Reply keyboard listing every command, three per row
pub fn menu_keyboard() -> KeyboardMarkup {
    let rows: Vec<Vec<KeyboardButton>> = Command::ALL
        .chunks(3)
        .map(|row| {
            row.iter()
                .map(|command| KeyboardButton::new(command.as_str()))
                .collect()
        })
        .collect();

    KeyboardMarkup::new(rows)
        .resize_keyboard()
        .one_time_keyboard()
}

/// `Answers:` or `Answers for <subject>:` followed by the generated text.
/// The header is the same in every locale.
pub fn format_answer_reply(subject: Option<&str>, answer: &str) -> String {
    match subject {
        Some(subject) => format!("Answers for {subject}:\n{answer}"),
        None => format!("Answers:\n{answer}"),
    }
}

/// Failure reply for a photo; the prefix is the same in every locale
pub fn format_error_reply(message: &str) -> String {
    format!("Error: {message}")
}

/// Numbered history listing, or the fixed "no history" message
pub fn format_history(records: &[AnswerRecord], language_code: Option<&str>) -> String {
    if records.is_empty() {
        return t_lang("history-empty", language_code);
    }

    let count = records.len().to_string();
    let mut result = t_args_lang("history-title", &[("count", count.as_str())], language_code);

    for (i, record) in records.iter().enumerate() {
        result.push_str(&format!("\n\n{}. [{}]\n{}", i + 1, record.timestamp, record.text));
    }

    result
}

/// Split text into chunks of at most `limit` characters, preferring line breaks
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();

        if current_len + line_len > limit && !current.is_empty() {
            parts.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if line_len > limit {
            // A single line longer than the limit is cut at character boundaries
            let chars: Vec<char> = line.chars().collect();
            for chunk in chars.chunks(limit) {
                if chunk.len() == limit {
                    parts.push(chunk.iter().collect());
                } else {
                    current = chunk.iter().collect();
                    current_len = chunk.len();
                }
            }
            continue;
        }

        current.push_str(line);
        current_len += line_len;
    }

    if !current.is_empty() {
        parts.push(current);
    }

    parts
}
