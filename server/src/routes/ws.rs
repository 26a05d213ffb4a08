//! WebSocket handler for the community chat relay.
//!
//! DESIGN
//! ======
//! On upgrade, generates a client ID, registers the client's outbound queue
//! with the relay, and enters a `select!` loop:
//! - Incoming client frames → parse + dispatch by syscall
//! - Relay frames (including the client's own publishes) → forward to client
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → join relay → send `session:connected` with `client_id`
//! 2. `chat:send` → relay fans out `chat:receive` to every client
//! 3. Unknown syscall → error reply to sender; bad JSON → `gateway:error`
//! 4. Close or transport error → part relay

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use frames::{
    CHAT_SEND, Data, FRAME_CODE, FRAME_MESSAGE, Frame, GATEWAY_ERROR, SESSION_CONNECTED, Status, decode_frame,
    encode_frame,
};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::services::relay::CLIENT_QUEUE;
use crate::state::AppState;

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let client_id = Uuid::new_v4();

    // Join before the welcome so nothing published after it is missed.
    let (client_tx, mut client_rx) = mpsc::channel::<Frame>(CLIENT_QUEUE);
    state.relay.join(client_id, client_tx).await;

    let welcome = Frame::request(SESSION_CONNECTED, Data::new()).with_data("client_id", client_id.to_string());
    if send_frame(&mut socket, &welcome).await.is_err() {
        state.relay.part(client_id).await;
        return;
    }

    info!(%client_id, "ws: client connected");

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(msg) = msg else { break };
                let Ok(msg) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        let replies = process_inbound_text(&state, client_id, &text).await;
                        if send_frames(&mut socket, &replies).await.is_err() {
                            break;
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            Some(frame) = client_rx.recv() => {
                if send_frame(&mut socket, &frame).await.is_err() {
                    break;
                }
            }
        }
    }

    state.relay.part(client_id).await;
    info!(%client_id, "ws: client disconnected");
}

// =============================================================================
// FRAME DISPATCH
// =============================================================================

/// Parse and process one inbound text frame and return frames for the sender
/// only. Fan-out goes through the relay.
async fn process_inbound_text(state: &AppState, client_id: Uuid, text: &str) -> Vec<Frame> {
    let req = match decode_frame(text) {
        Ok(r) => r,
        Err(e) => {
            warn!(%client_id, error = %e, "ws: invalid inbound frame");
            let err = Frame::request(GATEWAY_ERROR, Data::new())
                .with_data(FRAME_MESSAGE, format!("invalid frame: {e}"))
                .with_data(FRAME_CODE, "E_INVALID_FRAME");
            return vec![err];
        }
    };

    info!(%client_id, id = %req.id, syscall = %req.syscall, "ws: recv frame");

    if req.syscall == CHAT_SEND {
        state.relay.publish(client_id, req.data).await;
        return Vec::new();
    }

    vec![
        req.error(format!("unknown syscall: {}", req.syscall))
            .with_data(FRAME_CODE, "E_UNKNOWN_SYSCALL"),
    ]
}

async fn send_frames(socket: &mut WebSocket, frames: &[Frame]) -> Result<(), ()> {
    for frame in frames {
        send_frame(socket, frame).await?;
    }
    Ok(())
}

async fn send_frame(socket: &mut WebSocket, frame: &Frame) -> Result<(), ()> {
    let json = match encode_frame(frame) {
        Ok(j) => j,
        Err(e) => {
            warn!(error = %e, "ws: failed to serialize frame");
            return Err(());
        }
    };
    if frame.status == Status::Error {
        let message = frame.message().unwrap_or("-");
        warn!(id = %frame.id, syscall = %frame.syscall, message, "ws: send frame status=Error");
    } else {
        tracing::debug!(id = %frame.id, syscall = %frame.syscall, status = ?frame.status, "ws: send frame");
    }
    socket.send(Message::Text(json.into())).await.map_err(|_| ())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
