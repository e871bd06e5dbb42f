//! API Router and Application State
//!
//! Central routing configuration and shared state. Every component is
//! constructed once at startup and injected; there are no ambient globals.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::bots::BotRegistry;
use crate::broadcast::Broadcaster;
use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::quotes::QuoteStore;
use crate::rooms::RoomSubscriptionManager;
use crate::transport::outbox::Outbox;
use crate::transport::ChatTransport;
use crate::users::UserDirectory;
use crate::webhook;

pub mod bots;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Server configuration
    pub config: Arc<Config>,
    /// Chat platform transport
    pub transport: Arc<dyn ChatTransport>,
    /// Fire-and-forget outbound message queue
    pub outbox: Outbox,
    /// Quote storage
    pub quotes: QuoteStore,
    /// Tenant registry
    pub registry: BotRegistry,
    /// Room subscription state
    pub rooms: RoomSubscriptionManager,
    /// Per-tenant user authorization
    pub users: UserDirectory,
    /// Quote fan-out
    pub broadcaster: Broadcaster,
    /// Command routing
    pub dispatcher: Dispatcher,
}

impl AppState {
    /// Create new application state, wiring every component to the pool and
    /// the transport.
    #[must_use]
    pub fn new(db: SqlitePool, config: Config, transport: Arc<dyn ChatTransport>) -> Self {
        let outbox = Outbox::new(transport.clone(), config.outbox_capacity);
        let quotes = QuoteStore::new(db.clone());
        let registry = BotRegistry::new(db.clone());
        let rooms = RoomSubscriptionManager::new(db.clone());
        let users = UserDirectory::new(db.clone());
        let broadcaster = Broadcaster::new(quotes.clone(), rooms.clone(), outbox.clone());
        let dispatcher = Dispatcher::new(
            quotes.clone(),
            rooms.clone(),
            users.clone(),
            broadcaster.clone(),
            outbox.clone(),
        );
        Self {
            db,
            config: Arc::new(config),
            transport,
            outbox,
            quotes,
            registry,
            rooms,
            users,
            broadcaster,
            dispatcher,
        }
    }
}

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Webhook ingress
        .route("/webhook", post(webhook::handlers::receive_event))
        // Management API
        .route("/api/bots", post(bots::provision_bot))
        .route("/api/bots/{bot_id}/users", post(bots::authorize_user))
        .route("/api/bots/{bot_id}/quotes", post(bots::add_quote))
        .route("/api/bots/{bot_id}/quote", get(bots::get_quote))
        .route("/api/bots/{bot_id}/ping", post(bots::ping_room))
        .route("/api/bots/{bot_id}/broadcast", post(bots::broadcast))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // State
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    /// Service status
    status: &'static str,
}

/// Health check endpoint.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
