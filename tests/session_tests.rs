//! Session store behaviour seen through the `SessionStore` trait

use teloxide::types::UserId;

use mcq_solver_bot::session::{AnswerRecord, InMemorySessionStore, SessionStore, HISTORY_LIMIT};

const USER: UserId = UserId(42);

fn record(i: usize) -> AnswerRecord {
    AnswerRecord::new(format!("01/0{}/2025, 10:00:00 AM", i % 9 + 1), format!("{i}. A - answer {i}"))
}

#[test]
fn test_history_keeps_last_ten_in_order() {
    for appended in [0, 1, 9, 10, 11, 25] {
        let store = InMemorySessionStore::new();
        for i in 0..appended {
            store.append_history(USER, record(i));
        }

        let history = store.history(USER);
        assert_eq!(history.len(), appended.min(HISTORY_LIMIT));

        let expected: Vec<String> = (appended.saturating_sub(HISTORY_LIMIT)..appended)
            .map(|i| format!("{i}. A - answer {i}"))
            .collect();
        let texts: Vec<String> = history.into_iter().map(|r| r.text).collect();
        assert_eq!(texts, expected);
    }
}

#[test]
fn test_unknown_user_reads_empty() {
    let store = InMemorySessionStore::new();

    assert!(store.subject(USER).is_none());
    assert!(store.history(USER).is_empty());
    assert_eq!(store.session_count(), 0);
}

#[test]
fn test_clear_keeps_subject() {
    let store = InMemorySessionStore::new();
    store.set_subject(USER, "Chemistry".to_string());
    store.append_history(USER, record(1));
    store.append_history(USER, record(2));

    store.clear_history(USER);

    assert!(store.history(USER).is_empty());
    assert_eq!(store.subject(USER).as_deref(), Some("Chemistry"));
}

#[test]
fn test_clear_without_subject_or_session() {
    let store = InMemorySessionStore::new();

    // Clearing an unknown user is a no-op
    store.clear_history(USER);
    assert_eq!(store.session_count(), 0);

    store.append_history(USER, record(1));
    store.clear_history(USER);
    assert!(store.history(USER).is_empty());
    assert!(store.subject(USER).is_none());
}

#[test]
fn test_set_subject_overwrites() {
    let store = InMemorySessionStore::new();
    store.set_subject(USER, "Physics".to_string());
    store.set_subject(USER, "Biology".to_string());

    assert_eq!(store.subject(USER).as_deref(), Some("Biology"));
    assert_eq!(store.session_count(), 1);
}

#[test]
fn test_users_are_isolated() {
    let store = InMemorySessionStore::new();
    let other = UserId(7);

    store.set_subject(USER, "History".to_string());
    store.append_history(other, record(3));

    assert!(store.subject(other).is_none());
    assert!(store.history(USER).is_empty());
    assert_eq!(store.history(other).len(), 1);
}

#[test]
fn test_record_serializes_with_plain_fields() {
    let json = serde_json::to_value(record(4)).unwrap();

    assert_eq!(json["text"], "4. A - answer 4");
    assert!(json["timestamp"].as_str().unwrap().contains("2025"));
}
