use super::*;
use chrono::{TimeZone, Utc};

fn new_user(email: &str) -> NewUser {
    NewUser {
        name: "Ann".into(),
        email: email.into(),
        phone: "5551234567".into(),
        password_hash: "hash".into(),
    }
}

fn new_message(text: &str) -> NewMessage {
    NewMessage {
        author: "Ann".into(),
        text: text.into(),
        timestamp: Utc::now(),
    }
}

#[tokio::test]
async fn created_user_is_found_by_email() {
    let store = MemoryStore::new();
    let created = store.create_user(new_user("ann@example.com")).await.expect("create");

    let found = store
        .find_user_by_email("ann@example.com")
        .await
        .expect("lookup")
        .expect("present");
    assert_eq!(found.id, created.id);
    assert!(store.find_user_by_email("bob@example.com").await.expect("lookup").is_none());
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let store = MemoryStore::new();
    store.create_user(new_user("ann@example.com")).await.expect("create");
    let err = store.create_user(new_user("ann@example.com")).await;
    assert!(matches!(err, Err(StoreError::DuplicateEmail)));
}

#[tokio::test]
async fn appended_messages_get_ids() {
    let store = MemoryStore::new();
    let stored = store.append_message(new_message("hi")).await.expect("append");
    assert!(stored.id.is_some());
    assert_eq!(stored.text, "hi");
}

#[tokio::test]
async fn recent_returns_last_n_in_arrival_order() {
    let store = MemoryStore::new();
    for i in 0..60 {
        store.append_message(new_message(&format!("m{i}"))).await.expect("append");
    }

    let recent = store.recent_messages(50).await.expect("recent");
    assert_eq!(recent.len(), 50);
    assert_eq!(recent.first().map(|m| m.text.as_str()), Some("m10"));
    assert_eq!(recent.last().map(|m| m.text.as_str()), Some("m59"));
}

#[tokio::test]
async fn arrival_order_wins_over_timestamp() {
    let store = MemoryStore::new();
    let later = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).single().expect("valid date");
    let earlier = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).single().expect("valid date");

    store
        .append_message(NewMessage { timestamp: later, ..new_message("first") })
        .await
        .expect("append");
    store
        .append_message(NewMessage { timestamp: earlier, ..new_message("second") })
        .await
        .expect("append");

    let recent = store.recent_messages(10).await.expect("recent");
    let texts: Vec<_> = recent.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["first", "second"]);
}

#[tokio::test]
async fn recent_on_empty_store_is_empty() {
    let store = MemoryStore::new();
    assert!(store.recent_messages(50).await.expect("recent").is_empty());
}
