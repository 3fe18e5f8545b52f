//! Pending `/subject` prompts and subject validation

use std::time::{Duration, Instant};
use teloxide::types::{ChatId, MessageId, UserId};

use mcq_solver_bot::dialogue::{
    validate_subject, PendingSubjectPrompts, SubjectRejection, MAX_SUBJECT_CHARS,
};

const USER: UserId = UserId(42);
const CHAT: ChatId = ChatId(1001);

#[test]
fn test_validate_subject() {
    assert_eq!(validate_subject("  Organic Chemistry \n").unwrap(), "Organic Chemistry");
    assert_eq!(validate_subject(""), Err(SubjectRejection::Empty));
    assert_eq!(validate_subject(" \t "), Err(SubjectRejection::Empty));
    assert!(validate_subject(&"é".repeat(MAX_SUBJECT_CHARS)).is_ok());
    assert_eq!(
        validate_subject(&"a".repeat(MAX_SUBJECT_CHARS + 1)),
        Err(SubjectRejection::TooLong)
    );
}

#[test]
fn test_prompt_completes_once() {
    let prompts = PendingSubjectPrompts::default();
    prompts.register(USER, CHAT, MessageId(10));

    assert!(!prompts.take(USER, CHAT, MessageId(11)));
    assert!(!prompts.take(UserId(7), CHAT, MessageId(10)));
    assert!(prompts.take(USER, CHAT, MessageId(10)));
    assert!(!prompts.take(USER, CHAT, MessageId(10)));
    assert!(prompts.is_empty());
}

#[test]
fn test_prompt_expires_after_ttl() {
    let prompts = PendingSubjectPrompts::new(Duration::from_secs(60), 10);
    let start = Instant::now();

    prompts.register_at(USER, CHAT, MessageId(10), start);
    prompts.register_at(USER, CHAT, MessageId(11), start);

    assert!(prompts.take_at(USER, CHAT, MessageId(10), start + Duration::from_secs(59)));
    assert!(!prompts.take_at(USER, CHAT, MessageId(11), start + Duration::from_secs(60)));
    assert!(prompts.is_empty());
}

#[test]
fn test_capacity_evicts_oldest() {
    let prompts = PendingSubjectPrompts::new(Duration::from_secs(600), 2);
    let start = Instant::now();

    prompts.register_at(UserId(1), CHAT, MessageId(1), start);
    prompts.register_at(UserId(2), CHAT, MessageId(2), start + Duration::from_secs(1));
    prompts.register_at(UserId(3), CHAT, MessageId(3), start + Duration::from_secs(2));

    assert_eq!(prompts.len(), 2);
    let later = start + Duration::from_secs(3);
    assert!(!prompts.take_at(UserId(1), CHAT, MessageId(1), later));
    assert!(prompts.take_at(UserId(2), CHAT, MessageId(2), later));
    assert!(prompts.take_at(UserId(3), CHAT, MessageId(3), later));
}

#[test]
fn test_newer_prompt_does_not_cancel_older() {
    let prompts = PendingSubjectPrompts::default();
    prompts.register(USER, CHAT, MessageId(10));
    prompts.register(USER, CHAT, MessageId(12));

    assert!(prompts.take(USER, CHAT, MessageId(10)));
    assert!(prompts.take(USER, CHAT, MessageId(12)));
}

#[test]
fn test_same_message_id_in_another_chat_does_not_complete() {
    let prompts = PendingSubjectPrompts::default();
    prompts.register(USER, CHAT, MessageId(10));

    assert!(!prompts.take(USER, ChatId(2002), MessageId(10)));
    assert_eq!(prompts.len(), 1);
    assert!(prompts.take(USER, CHAT, MessageId(10)));
}
