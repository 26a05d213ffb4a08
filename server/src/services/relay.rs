//! Broadcast relay: fan-out of chat frames to every connected client.
//!
//! SYSTEM CONTEXT
//! ==============
//! Each WebSocket connection registers an outbound `mpsc` sender here and
//! receives frames through it. Publishing is fire-and-forget: no persistence,
//! no replay, and a client that is not registered at publish time never sees
//! the frame. A full outbound queue drops frames for that client only; a
//! closed one unregisters the client.

use std::collections::HashMap;
use std::sync::Arc;

use frames::{CHAT_RECEIVE, Frame};
use serde_json::Value;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{RwLock, mpsc};
use tracing::info;
use uuid::Uuid;

/// Outbound queue depth per client.
pub const CLIENT_QUEUE: usize = 256;

#[derive(Clone, Default)]
pub struct Relay {
    clients: Arc<RwLock<HashMap<Uuid, mpsc::Sender<Frame>>>>,
}

impl Relay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a client's outbound channel.
    pub async fn join(&self, client_id: Uuid, tx: mpsc::Sender<Frame>) {
        let mut clients = self.clients.write().await;
        clients.insert(client_id, tx);
        info!(%client_id, connected = clients.len(), "client joined relay");
    }

    pub async fn part(&self, client_id: Uuid) {
        let mut clients = self.clients.write().await;
        if clients.remove(&client_id).is_some() {
            info!(%client_id, connected = clients.len(), "client left relay");
        }
    }

    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.clients.read().await.is_empty()
    }

    /// Deliver `frame` to every registered client, the sender included.
    /// Returns how many queues accepted it. Clients whose receiver is gone are
    /// unregistered.
    pub async fn broadcast(&self, frame: &Frame) -> usize {
        let mut delivered = 0;
        let mut closed = Vec::new();
        {
            let clients = self.clients.read().await;
            for (client_id, tx) in clients.iter() {
                match tx.try_send(frame.clone()) {
                    Ok(()) => delivered += 1,
                    Err(TrySendError::Full(_)) => {
                        tracing::debug!(%client_id, "client queue full; frame dropped");
                    }
                    Err(TrySendError::Closed(_)) => closed.push(*client_id),
                }
            }
        }

        if !closed.is_empty() {
            let mut clients = self.clients.write().await;
            for client_id in closed {
                if clients.get(&client_id).is_some_and(mpsc::Sender::is_closed) {
                    clients.remove(&client_id);
                    info!(%client_id, connected = clients.len(), "closed client pruned from relay");
                }
            }
        }

        delivered
    }

    /// Wrap `data` as a `chat:receive` frame from `from` and broadcast it.
    /// The payload is relayed as-is, whatever its JSON shape.
    pub async fn publish(&self, from: Uuid, data: impl Into<Value>) -> usize {
        let frame = Frame::request(CHAT_RECEIVE, data).with_from(from.to_string());
        let delivered = self.broadcast(&frame).await;
        tracing::debug!(%from, delivered, "chat frame relayed");
        delivered
    }
}

#[cfg(test)]
#[path = "relay_test.rs"]
mod tests;
