//! Relay websocket connection for live chat.

use std::time::Duration;

use frames::{CHAT_RECEIVE, CHAT_SEND, ChatMessage, Frame, GATEWAY_ERROR, SESSION_CONNECTED, Status};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::CliError;
use crate::api::ws_url;

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// One decoded inbound relay frame.
#[derive(Debug, PartialEq, Eq)]
pub enum RelayEvent {
    Chat(ChatMessage),
    Error(String),
    /// Anything else, including `chat:receive` payloads that are not chat
    /// messages.
    Other,
}

pub struct RelayConnection {
    stream: WsStream,
    client_id: String,
}

impl RelayConnection {
    /// Connect and wait for `session:connected`.
    pub async fn connect(base_url: &str) -> Result<Self, CliError> {
        let (mut stream, _) = connect_async(ws_url(base_url)?)
            .await
            .map_err(|error| CliError::WsConnect(Box::new(error)))?;

        let client_id = tokio::time::timeout(CONNECT_TIMEOUT, async {
            loop {
                let frame = recv_frame(&mut stream).await?;
                if frame.syscall == SESSION_CONNECTED {
                    return frame
                        .data
                        .get("client_id")
                        .and_then(Value::as_str)
                        .map(ToOwned::to_owned)
                        .ok_or(CliError::MissingField("client_id"));
                }
            }
        })
        .await
        .map_err(|_| CliError::Timeout)??;

        Ok(Self { stream, client_id })
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Publish a stored message to every connected client.
    pub async fn publish(&mut self, message: &ChatMessage) -> Result<(), CliError> {
        let frame = Frame::request(CHAT_SEND, message.to_data());
        self.stream
            .send(Message::Text(frames::encode_frame(&frame)?.into()))
            .await
            .map_err(|error| CliError::WsConnect(Box::new(error)))
    }

    /// Wait for the next relay frame.
    pub async fn next_event(&mut self) -> Result<RelayEvent, CliError> {
        Ok(decode_event(recv_frame(&mut self.stream).await?))
    }

    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }
}

pub(crate) fn decode_event(frame: Frame) -> RelayEvent {
    if frame.status == Status::Error || frame.syscall == GATEWAY_ERROR {
        return RelayEvent::Error(frame.message().unwrap_or("relay error").to_owned());
    }
    if frame.syscall == CHAT_RECEIVE {
        if let Ok(message) = ChatMessage::from_data(&frame.data) {
            return RelayEvent::Chat(message);
        }
    }
    RelayEvent::Other
}

async fn recv_frame(stream: &mut WsStream) -> Result<Frame, CliError> {
    loop {
        let Some(message) = stream.next().await else {
            return Err(CliError::WsClosed);
        };
        match message.map_err(|error| CliError::WsConnect(Box::new(error)))? {
            Message::Text(text) => return frames::decode_frame(text.as_str()).map_err(CliError::from),
            Message::Close(_) => return Err(CliError::WsClosed),
            _ => {}
        }
    }
}

#[cfg(test)]
#[path = "relay_test.rs"]
mod tests;
