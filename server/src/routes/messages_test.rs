use super::*;
use crate::state::test_helpers::{json_request, register_and_login, send, test_app_state};
use serde_json::json;

#[tokio::test]
async fn empty_history_is_empty_array() {
    let state = test_app_state();
    let (status, body) = send(&state, json_request("GET", "/messages", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn post_requires_token() {
    let state = test_app_state();
    let (status, body) = send(&state, json_request("POST", "/messages", Some(json!({ "text": "hi" })), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (_, history) = send(&state, json_request("GET", "/messages", None, None)).await;
    assert_eq!(history, json!([]));
}

#[tokio::test]
async fn post_uses_token_identity_not_body_author() {
    let state = test_app_state();
    let token = register_and_login(&state, "Ann", "ann@example.com").await;

    let body = json!({ "text": "  hello world ", "author": "Mallory", "user": "Mallory" });
    let (status, created) = send(&state, json_request("POST", "/messages", Some(body), Some(&token))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["author"], "Ann");
    assert_eq!(created["text"], "hello world");
    assert!(created["id"].as_str().is_some());

    let (_, history) = send(&state, json_request("GET", "/messages", None, None)).await;
    assert_eq!(history.as_array().map(Vec::len), Some(1));
    assert_eq!(history[0]["author"], "Ann");
}

#[tokio::test]
async fn message_alias_and_explicit_timestamp() {
    let state = test_app_state();
    let token = register_and_login(&state, "Ann", "ann@example.com").await;

    let body = json!({ "message": "aliased", "timestamp": "2025-03-01T12:00:00Z" });
    let (status, created) = send(&state, json_request("POST", "/messages", Some(body), Some(&token))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["text"], "aliased");
    assert_eq!(created["timestamp"], "2025-03-01T12:00:00Z");
}

#[tokio::test]
async fn blank_text_is_400() {
    let state = test_app_state();
    let token = register_and_login(&state, "Ann", "ann@example.com").await;

    for body in [json!({ "text": "   " }), json!({})] {
        let (status, json) = send(&state, json_request("POST", "/messages", Some(body), Some(&token))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "E_MESSAGE_EMPTY");
    }
}

#[tokio::test]
async fn history_is_capped_and_oldest_first() {
    let state = test_app_state();
    let token = register_and_login(&state, "Ann", "ann@example.com").await;

    for i in 1..=60 {
        let body = json!({ "text": format!("M{i}") });
        let (status, _) = send(&state, json_request("POST", "/messages", Some(body), Some(&token))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, history) = send(&state, json_request("GET", "/messages", None, None)).await;
    let texts: Vec<_> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["text"].as_str().unwrap().to_owned())
        .collect();
    let expected: Vec<_> = (11..=60).map(|i| format!("M{i}")).collect();
    assert_eq!(texts, expected);

    let (_, limited) = send(&state, json_request("GET", "/messages?limit=3", None, None)).await;
    let texts: Vec<_> = limited.as_array().unwrap().iter().map(|m| m["text"].clone()).collect();
    assert_eq!(texts, vec![json!("M58"), json!("M59"), json!("M60")]);

    let (_, over) = send(&state, json_request("GET", "/messages?limit=500", None, None)).await;
    assert_eq!(over.as_array().map(Vec::len), Some(50));
}

#[tokio::test]
async fn malformed_limit_gets_uniform_error_body() {
    let state = test_app_state();
    for uri in ["/messages?limit=abc", "/messages?limit=-1"] {
        let (status, body) = send(&state, json_request("GET", uri, None, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["success"], false, "{uri}");
        assert_eq!(body["code"], "E_VALIDATION", "{uri}");
        assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()), "{uri}");
    }
}
