//! Outbound Message Queue
//!
//! Bounded in-process channel decoupling message delivery from the
//! request-acknowledgment path. A worker drains the channel and spawns one
//! task per send; each task logs its own failure, nothing is retried, and
//! no ordering is guaranteed between rooms.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info};

use super::ChatTransport;

/// A message queued for delivery to a room.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub token: String,
    pub room_id: String,
    pub text: String,
}

impl OutboundMessage {
    /// Build a message addressed to a room.
    #[must_use]
    pub fn new(token: &str, room_id: &str, text: &str) -> Self {
        Self {
            token: token.to_string(),
            room_id: room_id.to_string(),
            text: text.to_string(),
        }
    }
}

/// Handle for submitting fire-and-forget sends.
#[derive(Clone)]
pub struct Outbox {
    tx: mpsc::Sender<OutboundMessage>,
}

impl Outbox {
    /// Create the outbox and spawn its delivery worker.
    #[must_use]
    pub fn new(transport: Arc<dyn ChatTransport>, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        tokio::spawn(run_delivery_worker(transport, rx));
        Self { tx }
    }

    /// Queue a message for delivery. Waits for channel capacity when the
    /// queue is full but never for the delivery itself.
    pub async fn send(&self, message: OutboundMessage) {
        if let Err(e) = self.tx.send(message).await {
            error!("Delivery worker is gone, dropping message: {}", e);
        }
    }
}

/// Drain the queue, one spawned task per send.
async fn run_delivery_worker(
    transport: Arc<dyn ChatTransport>,
    mut rx: mpsc::Receiver<OutboundMessage>,
) {
    info!("Message delivery worker started");
    while let Some(message) = rx.recv().await {
        let transport = transport.clone();
        tokio::spawn(async move {
            if let Err(e) = transport
                .send_message(&message.token, &message.room_id, &message.text)
                .await
            {
                error!(room_id = %message.room_id, "Failed to deliver message: {}", e);
            }
        });
    }
}
