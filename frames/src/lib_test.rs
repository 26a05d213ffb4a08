use super::*;
use chrono::TimeZone;

fn sample_message() -> ChatMessage {
    ChatMessage {
        id: Some(Uuid::new_v4()),
        author: "Ann".to_owned(),
        text: "hello".to_owned(),
        timestamp: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).single().expect("valid time"),
    }
}

#[test]
fn request_sets_fields() {
    let frame = Frame::request(CHAT_SEND, Data::new());
    assert_eq!(frame.syscall, "chat:send");
    assert_eq!(frame.status, Status::Request);
    assert!(frame.parent_id.is_none());
    assert!(frame.ts > 0);
}

#[test]
fn error_reply_points_at_request() {
    let req = Frame::request("chat:bogus", Data::new());
    let err = req.error("unknown event");
    assert_eq!(err.status, Status::Error);
    assert_eq!(err.parent_id, Some(req.id));
    assert_eq!(err.syscall, "chat:bogus");
    assert_eq!(err.message(), Some("unknown event"));
}

#[test]
fn decode_keeps_non_object_payloads() {
    let id = Uuid::new_v4();
    for payload in [r#""hello""#, "[1,2,3]", "42", "null"] {
        let text = format!(r#"{{"id":"{id}","syscall":"chat:send","data":{payload}}}"#);
        let frame = decode_frame(&text).expect("any JSON payload should decode");
        let expected: Value = serde_json::from_str(payload).expect("valid json");
        assert_eq!(frame.data, expected);
    }
}

#[test]
fn missing_data_decodes_as_null() {
    let id = Uuid::new_v4();
    let frame = decode_frame(&format!(r#"{{"id":"{id}","syscall":"chat:send"}}"#)).expect("decode");
    assert!(frame.data.is_null());
}

#[test]
fn with_data_turns_scalar_payload_into_object() {
    let frame = Frame::request(CHAT_RECEIVE, "hello").with_data("client_id", "c1");
    assert_eq!(frame.data, serde_json::json!({ "client_id": "c1" }));
}

#[test]
fn decode_accepts_minimal_client_frame() {
    let id = Uuid::new_v4();
    let text = format!(r#"{{"id":"{id}","syscall":"chat:send","data":{{"text":"hi"}}}}"#);
    let frame = decode_frame(&text).expect("minimal frame should decode");
    assert_eq!(frame.id, id);
    assert_eq!(frame.status, Status::Request);
    assert_eq!(frame.data.get("text").and_then(Value::as_str), Some("hi"));
    assert!(frame.from.is_none());
}

#[test]
fn decode_rejects_garbage() {
    let err = decode_frame("not json").expect_err("garbage should fail");
    assert!(matches!(err, CodecError::Decode(_)));
}

#[test]
fn decode_rejects_frame_without_syscall() {
    let id = Uuid::new_v4();
    assert!(decode_frame(&format!(r#"{{"id":"{id}"}}"#)).is_err());
}

#[test]
fn encoded_frame_survives_decode() {
    let frame = Frame::request(CHAT_RECEIVE, sample_message().to_data()).with_from("client-1");
    let text = encode_frame(&frame).expect("encode");
    assert_eq!(decode_frame(&text).expect("decode"), frame);
}

#[test]
fn chat_message_payload_uses_rfc3339_timestamp() {
    let data = sample_message().to_data();
    assert_eq!(data.get("timestamp").and_then(Value::as_str), Some("2025-03-01T12:00:00Z"));
    assert_eq!(data.get("author").and_then(Value::as_str), Some("Ann"));
}

#[test]
fn chat_message_from_data_restores_record() {
    let msg = sample_message();
    assert_eq!(ChatMessage::from_data(&Value::Object(msg.to_data())).expect("parse"), msg);
}

#[test]
fn local_chat_message_omits_id() {
    let msg = ChatMessage { id: None, ..sample_message() };
    let data = msg.to_data();
    assert!(!data.contains_key("id"));
    assert_eq!(ChatMessage::from_data(&Value::Object(data)).expect("parse").id, None);
}

#[test]
fn chat_message_from_data_rejects_arbitrary_payload() {
    let mut data = Data::new();
    data.insert("emoji".into(), serde_json::json!("wave"));
    let err = ChatMessage::from_data(&Value::Object(data)).expect_err("payload lacks fields");
    assert!(matches!(err, CodecError::NotChatMessage(_)));

    let err = ChatMessage::from_data(&serde_json::json!("hello")).expect_err("bare string");
    assert!(matches!(err, CodecError::NotChatMessage(_)));
}
