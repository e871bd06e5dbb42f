//! Webhook Ingress Handler
//!
//! Single entry point for chat-platform events. Authentication failures and
//! unknown tenants reject the request; anything that goes wrong after the
//! event is authenticated is logged and the webhook is still acknowledged,
//! since the origin only cares that the event was received.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use tracing::{error, info, instrument};

use super::signing::{self, SIGNATURE_HEADER};
use super::types::{WebhookEvent, WebhookError};
use crate::api::AppState;
use crate::bots::BotError;

/// POST /webhook
#[instrument(skip_all)]
pub async fn receive_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, (StatusCode, String)> {
    let event: WebhookEvent =
        serde_json::from_slice(&body).map_err(|_| WebhookError::MalformedPayload)?;

    let bot = match state.registry.get(&event.created_by).await {
        Ok(bot) => bot,
        Err(BotError::Database(e)) => return Err(WebhookError::Database(e).into()),
        Err(_) => return Err(WebhookError::UnknownBot(event.created_by).into()),
    };

    // The signature covers the exact raw request bytes, so it must be
    // checked against `body` before any further processing.
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !signing::verify_signature(&bot.signing_secret, &body, signature) {
        info!(bot_id = %bot.id, "Rejected webhook with bad signature");
        return Err(WebhookError::Unauthorized.into());
    }

    let text = match state
        .transport
        .fetch_message_text(&bot.access_token, &event.data.id)
        .await
    {
        Ok(text) => text,
        Err(e) => {
            // Transport failures never escalate to the acknowledgment.
            error!(
                bot_id = %bot.id,
                message_id = %event.data.id,
                "Failed to fetch message text: {}", e
            );
            return Ok(StatusCode::OK);
        }
    };

    state
        .dispatcher
        .dispatch(&bot, &event.data.room_id, &event.data.person_id, &text)
        .await;

    Ok(StatusCode::OK)
}
