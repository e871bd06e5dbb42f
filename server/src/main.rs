//! Quotebot Server - Main Entry Point
//!
//! Multi-tenant quote bot backend for team chat platforms.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use quotebot_server::transport::HttpTransport;
use quotebot_server::{api, config, db, scheduler, seed};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quotebot_server=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Quotebot Server"
    );

    // Initialize database
    let db_pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&db_pool).await?;

    // Chat platform transport
    let transport = Arc::new(HttpTransport::new(&config.chat_api_url)?);

    // Build application state
    let state = api::AppState::new(db_pool, config, transport);

    // Optional bulk seed load
    if let Some(path) = state.config.seed_file.clone() {
        seed::load(&path, &state.registry, &state.users, &state.quotes).await?;
    }

    // Scheduled daily broadcast
    tokio::spawn(scheduler::run(state.clone()));

    // Build router
    let app = api::create_router(state.clone());

    // Start server
    let listener = tokio::net::TcpListener::bind(&state.config.bind_address).await?;
    info!(address = %state.config.bind_address, "Server listening");

    // Graceful shutdown handler
    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
        info!("Received shutdown signal, cleaning up...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shutdown complete");

    Ok(())
}
