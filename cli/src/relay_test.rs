use super::*;
use chrono::{TimeZone, Utc};
use frames::Data;
use serde_json::json;

fn message() -> ChatMessage {
    ChatMessage {
        id: Some(uuid::Uuid::new_v4()),
        author: "Ann".into(),
        text: "hello".into(),
        timestamp: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).single().unwrap(),
    }
}

#[test]
fn chat_receive_decodes_message() {
    let msg = message();
    let frame = Frame::request(CHAT_RECEIVE, msg.to_data()).with_from("peer");
    assert_eq!(decode_event(frame), RelayEvent::Chat(msg));
}

#[test]
fn arbitrary_payload_is_other() {
    let mut data = Data::new();
    data.insert("emoji".into(), json!("wave"));
    assert_eq!(decode_event(Frame::request(CHAT_RECEIVE, data)), RelayEvent::Other);
    assert_eq!(decode_event(Frame::request(SESSION_CONNECTED, Data::new())), RelayEvent::Other);
    assert_eq!(decode_event(Frame::request(CHAT_RECEIVE, json!("hello"))), RelayEvent::Other);
    assert_eq!(decode_event(Frame::request(CHAT_RECEIVE, json!([1, 2]))), RelayEvent::Other);
}

#[test]
fn error_frames_carry_message() {
    let req = Frame::request("board:join", Data::new());
    assert_eq!(decode_event(req.error("unknown syscall: board:join")), RelayEvent::Error("unknown syscall: board:join".into()));

    let gateway = Frame::request(GATEWAY_ERROR, Data::new()).with_data("message", "invalid frame");
    assert_eq!(decode_event(gateway), RelayEvent::Error("invalid frame".into()));
}
