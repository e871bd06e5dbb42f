//! Chat Transport
//!
//! Abstract messaging transport to the chat platform, plus the HTTP
//! implementation against a Webex-style REST API. Calls are opaque remote
//! operations; failures are logged by callers and never retried at this
//! layer.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

pub mod outbox;

/// Errors from the chat platform API.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Request failed before a response arrived.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Chat API answered with a non-success status.
    #[error("Chat API returned {0}")]
    Status(reqwest::StatusCode),
    /// Response body did not carry the expected fields.
    #[error("Malformed chat API response: {0}")]
    Malformed(String),
}

/// Messaging operations the backend needs from the chat platform.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Resolve a message id to its text.
    async fn fetch_message_text(
        &self,
        token: &str,
        message_id: &str,
    ) -> Result<String, TransportError>;

    /// Post a message to a room on behalf of a tenant.
    async fn send_message(
        &self,
        token: &str,
        room_id: &str,
        text: &str,
    ) -> Result<(), TransportError>;
}

/// Message resource as returned by the chat API.
#[derive(Debug, Deserialize)]
struct MessageResource {
    text: Option<String>,
}

/// reqwest-backed transport against a Webex-style REST API.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a transport for the given API base URL.
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn fetch_message_text(
        &self,
        token: &str,
        message_id: &str,
    ) -> Result<String, TransportError> {
        let url = format!("{}/messages/{message_id}", self.base_url);
        let response = self.client.get(&url).bearer_auth(token).send().await?;
        if !response.status().is_success() {
            return Err(TransportError::Status(response.status()));
        }
        let message: MessageResource = response.json().await?;
        message
            .text
            .ok_or_else(|| TransportError::Malformed("message has no text".to_string()))
    }

    async fn send_message(
        &self,
        token: &str,
        room_id: &str,
        text: &str,
    ) -> Result<(), TransportError> {
        let url = format!("{}/messages", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&json!({ "roomId": room_id, "text": text }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(TransportError::Status(response.status()));
        }
        Ok(())
    }
}
