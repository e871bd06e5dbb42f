//! Room Subscriptions
//!
//! Tracks which rooms each tenant has been in contact with and whether a
//! room receives the daily broadcast. Rooms come into existence on first
//! contact and are never removed.

use axum::http::StatusCode;
use sqlx::SqlitePool;
use thiserror::Error;

use crate::db::Room;

/// Errors that can occur during room operations.
#[derive(Error, Debug)]
pub enum RoomError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    /// Room was never established for this tenant.
    #[error("Room not found")]
    NotFound,
}

impl From<RoomError> for (StatusCode, String) {
    fn from(err: RoomError) -> Self {
        match err {
            RoomError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            RoomError::NotFound => (StatusCode::NOT_FOUND, err.to_string()),
        }
    }
}

/// Per-tenant room subscription state over the shared document store.
#[derive(Clone)]
pub struct RoomSubscriptionManager {
    pool: SqlitePool,
}

impl RoomSubscriptionManager {
    /// Create a manager over the given pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record first contact with a room. Inserts the room with
    /// `daily = true` if absent; a no-op when it already exists. The upsert
    /// makes interleaved first contacts converge on one record.
    pub async fn ensure_room(&self, bot_id: &str, room_id: &str) -> Result<(), RoomError> {
        sqlx::query("INSERT OR IGNORE INTO rooms (bot_id, room_id, daily) VALUES (?, ?, 1)")
            .bind(bot_id)
            .bind(room_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Set or flip the room's daily flag and return the resulting value.
    ///
    /// Requires the room to already exist via [`Self::ensure_room`]; never
    /// fabricates a room entry.
    pub async fn toggle_daily(
        &self,
        bot_id: &str,
        room_id: &str,
        force: Option<bool>,
    ) -> Result<bool, RoomError> {
        let current: Option<(bool,)> =
            sqlx::query_as("SELECT daily FROM rooms WHERE bot_id = ? AND room_id = ?")
                .bind(bot_id)
                .bind(room_id)
                .fetch_optional(&self.pool)
                .await?;

        let (daily,) = current.ok_or(RoomError::NotFound)?;
        let new_value = force.unwrap_or(!daily);

        sqlx::query("UPDATE rooms SET daily = ? WHERE bot_id = ? AND room_id = ?")
            .bind(new_value)
            .bind(bot_id)
            .bind(room_id)
            .execute(&self.pool)
            .await?;

        Ok(new_value)
    }

    /// All rooms the tenant has seen, optionally narrowed to daily opt-ins.
    pub async fn rooms_for_broadcast(
        &self,
        bot_id: &str,
        only_daily_opted: bool,
    ) -> Result<Vec<Room>, RoomError> {
        let rooms: Vec<Room> = if only_daily_opted {
            sqlx::query_as("SELECT room_id, daily FROM rooms WHERE bot_id = ? AND daily = 1")
                .bind(bot_id)
                .fetch_all(&self.pool)
                .await?
        } else {
            sqlx::query_as("SELECT room_id, daily FROM rooms WHERE bot_id = ?")
                .bind(bot_id)
                .fetch_all(&self.pool)
                .await?
        };
        Ok(rooms)
    }
}
