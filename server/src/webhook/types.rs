//! Webhook Types
//!
//! Inbound event payload and the ingress error taxonomy.

use axum::http::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// A message-created notification from the chat platform. Carries only
/// identifiers; the message text is fetched out-of-band.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    /// Tenant the webhook is registered for.
    pub created_by: String,
    pub data: WebhookData,
}

/// Event payload identifiers.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookData {
    /// Message id, resolved to text via the transport.
    pub id: String,
    pub room_id: String,
    pub person_id: String,
}

/// Errors that can occur during webhook intake.
#[derive(Error, Debug)]
pub enum WebhookError {
    /// Signature missing or did not match the raw body.
    #[error("Invalid or missing signature")]
    Unauthorized,
    /// Event referenced a tenant the registry does not know.
    #[error("Unknown bot: {0}")]
    UnknownBot(String),
    /// Body was not a well-formed event.
    #[error("Malformed event payload")]
    MalformedPayload,
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<WebhookError> for (StatusCode, String) {
    fn from(err: WebhookError) -> Self {
        match err {
            WebhookError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            WebhookError::Unauthorized => (StatusCode::UNAUTHORIZED, err.to_string()),
            WebhookError::UnknownBot(_) | WebhookError::MalformedPayload => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
        }
    }
}
