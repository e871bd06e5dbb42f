//! Bot Management API
//!
//! Operator endpoints for provisioning tenants and driving quotes directly,
//! outside the webhook path.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::AppState;
use crate::bots::BotError;
use crate::db::{Bot, Quote};
use crate::webhook::signing;

/// Request body for provisioning a tenant.
#[derive(Debug, Deserialize)]
pub struct ProvisionBotRequest {
    /// Tenant id, as it appears in webhook `createdBy` fields.
    pub id: String,
    /// Chat platform bearer token for this tenant.
    pub access_token: String,
    /// Restrict the quote-add command to authorized users.
    #[serde(default)]
    pub auth_required: bool,
}

/// Response for a provisioned tenant. The signing secret is only returned
/// once, here.
#[derive(Debug, Serialize)]
pub struct ProvisionBotResponse {
    pub id: String,
    pub signing_secret: String,
}

/// Create a new tenant and generate its webhook signing secret.
#[instrument(skip(state, req))]
pub async fn provision_bot(
    State(state): State<AppState>,
    Json(req): Json<ProvisionBotRequest>,
) -> Result<(StatusCode, Json<ProvisionBotResponse>), (StatusCode, String)> {
    if req.id.is_empty() || req.id.len() > 100 {
        return Err((
            StatusCode::BAD_REQUEST,
            "Bot id must be between 1 and 100 characters".to_string(),
        ));
    }
    if req.access_token.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Access token must not be empty".to_string(),
        ));
    }

    let signing_secret = signing::generate_signing_secret();
    let bot = Bot {
        id: req.id,
        access_token: req.access_token,
        signing_secret: signing_secret.clone(),
        auth_required: req.auth_required,
    };
    state.registry.register(&bot).await?;

    info!(bot_id = %bot.id, "Bot provisioned");

    Ok((
        StatusCode::CREATED,
        Json(ProvisionBotResponse {
            id: bot.id,
            signing_secret,
        }),
    ))
}

/// Request body for authorizing a user.
#[derive(Debug, Deserialize)]
pub struct AuthorizeUserRequest {
    pub user_id: String,
}

/// Grant a user quote-add rights for a tenant.
#[instrument(skip(state, req))]
pub async fn authorize_user(
    State(state): State<AppState>,
    Path(bot_id): Path<String>,
    Json(req): Json<AuthorizeUserRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    let bot = state.registry.get(&bot_id).await?;
    state
        .users
        .authorize(&req.user_id, &bot.id)
        .await
        .map_err(BotError::Database)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Request body for adding a quote directly.
#[derive(Debug, Deserialize)]
pub struct AddQuoteRequest {
    pub text: String,
}

/// Store a quote for a tenant.
#[instrument(skip(state, req))]
pub async fn add_quote(
    State(state): State<AppState>,
    Path(bot_id): Path<String>,
    Json(req): Json<AddQuoteRequest>,
) -> Result<(StatusCode, Json<Quote>), (StatusCode, String)> {
    let bot = state.registry.get(&bot_id).await?;
    let quote = state.quotes.add(&req.text, &bot.id).await?;
    Ok((StatusCode::CREATED, Json(quote)))
}

/// Query parameters for the direct quote fetch.
#[derive(Debug, Deserialize)]
pub struct GetQuoteParams {
    /// Case-insensitive search filter; empty matches all.
    #[serde(default)]
    pub search: String,
}

/// Fetch a random quote for a tenant.
#[instrument(skip(state))]
pub async fn get_quote(
    State(state): State<AppState>,
    Path(bot_id): Path<String>,
    Query(params): Query<GetQuoteParams>,
) -> Result<Json<Quote>, (StatusCode, String)> {
    let bot = state.registry.get(&bot_id).await?;
    let quote = state.quotes.get_random(&bot.id, &params.search).await?;
    Ok(Json(quote))
}

/// Request body for pinging a single room.
#[derive(Debug, Deserialize)]
pub struct PingRoomRequest {
    pub room_id: String,
    /// Optional search filter for the quote.
    #[serde(default)]
    pub search: String,
}

/// Establish a room and queue one random quote for it.
#[instrument(skip(state, req))]
pub async fn ping_room(
    State(state): State<AppState>,
    Path(bot_id): Path<String>,
    Json(req): Json<PingRoomRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    let bot = state.registry.get(&bot_id).await?;
    state.rooms.ensure_room(&bot.id, &req.room_id).await?;
    state
        .broadcaster
        .send_random(&bot, &req.room_id, &req.search)
        .await?;
    Ok(StatusCode::ACCEPTED)
}

/// Broadcast response.
#[derive(Debug, Serialize)]
pub struct BroadcastResponse {
    /// Number of room sends queued.
    pub enqueued: usize,
}

/// Queue an immediate broadcast to every room of a tenant, ignoring the
/// daily flag.
#[instrument(skip(state))]
pub async fn broadcast(
    State(state): State<AppState>,
    Path(bot_id): Path<String>,
) -> Result<(StatusCode, Json<BroadcastResponse>), (StatusCode, String)> {
    let bot = state.registry.get(&bot_id).await?;
    let enqueued = state.broadcaster.broadcast(&bot, false).await;
    Ok((StatusCode::ACCEPTED, Json(BroadcastResponse { enqueued })))
}
