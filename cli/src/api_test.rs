use super::*;

#[test]
fn ws_url_maps_scheme() {
    assert_eq!(ws_url("http://127.0.0.1:3000").unwrap(), "ws://127.0.0.1:3000/ws");
    assert_eq!(ws_url("https://chat.example.com/").unwrap(), "wss://chat.example.com/ws");
    assert!(matches!(ws_url("ftp://x"), Err(CliError::InvalidBaseUrl(_))));
}

#[test]
fn error_message_prefers_body() {
    let body = json!({ "success": false, "code": "E_VALIDATION", "message": "All fields are required" });
    assert_eq!(error_message(StatusCode::BAD_REQUEST, &body), "All fields are required");
    assert_eq!(error_message(StatusCode::BAD_GATEWAY, &Value::Null), "HTTP 502");
}

#[test]
fn base_url_trailing_slash_is_trimmed() {
    let client = ApiClient::new("http://localhost:3000/", None);
    assert_eq!(client.base_url, "http://localhost:3000");
}
