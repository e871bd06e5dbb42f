//! Bot Registry
//!
//! Tenant lookup and provisioning. The dispatcher only reads from the
//! registry; writes happen through the management API and the seed loader.

use axum::http::StatusCode;
use sqlx::SqlitePool;
use thiserror::Error;

use crate::db::Bot;

/// Errors that can occur during registry operations.
#[derive(Error, Debug)]
pub enum BotError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    /// Tenant not found.
    #[error("Bot not found")]
    NotFound,
    /// Tenant id already registered.
    #[error("Bot already exists")]
    AlreadyExists,
}

impl From<BotError> for (StatusCode, String) {
    fn from(err: BotError) -> Self {
        match err {
            BotError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            BotError::NotFound => (StatusCode::NOT_FOUND, err.to_string()),
            BotError::AlreadyExists => (StatusCode::CONFLICT, err.to_string()),
        }
    }
}

/// Tenant lookup over the shared document store.
#[derive(Clone)]
pub struct BotRegistry {
    pool: SqlitePool,
}

impl BotRegistry {
    /// Create a registry over the given pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Resolve a tenant by id.
    pub async fn get(&self, bot_id: &str) -> Result<Bot, BotError> {
        let bot: Option<Bot> = sqlx::query_as(
            "SELECT id, access_token, signing_secret, auth_required FROM bots WHERE id = ?",
        )
        .bind(bot_id)
        .fetch_optional(&self.pool)
        .await?;

        bot.ok_or(BotError::NotFound)
    }

    /// All tenants, for the scheduled broadcast.
    pub async fn list_all(&self) -> Result<Vec<Bot>, BotError> {
        let bots: Vec<Bot> = sqlx::query_as(
            "SELECT id, access_token, signing_secret, auth_required FROM bots ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(bots)
    }

    /// Register a new tenant.
    pub async fn register(&self, bot: &Bot) -> Result<(), BotError> {
        sqlx::query(
            "INSERT INTO bots (id, access_token, signing_secret, auth_required) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(&bot.id)
        .bind(&bot.access_token)
        .bind(&bot.signing_secret)
        .bind(bot.auth_required)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .is_some_and(|db| db.is_unique_violation())
            {
                BotError::AlreadyExists
            } else {
                BotError::Database(e)
            }
        })?;
        Ok(())
    }
}
