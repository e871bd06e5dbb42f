//! Authorized Users
//!
//! Per-tenant authorization grants gating the quote-add command. A user is
//! exactly the set of tenants that accept quotes from them, so the grant
//! table is the whole record.

use sqlx::SqlitePool;

/// User authorization lookup over the shared document store.
#[derive(Clone)]
pub struct UserDirectory {
    pool: SqlitePool,
}

impl UserDirectory {
    /// Create a directory over the given pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Whether the user may add quotes for the tenant.
    pub async fn is_authorized(&self, user_id: &str, bot_id: &str) -> Result<bool, sqlx::Error> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM authorized_users WHERE user_id = ? AND bot_id = ?")
                .bind(user_id)
                .bind(bot_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    /// Grant the user quote-add rights for the tenant. Idempotent.
    pub async fn authorize(&self, user_id: &str, bot_id: &str) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT OR IGNORE INTO authorized_users (user_id, bot_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(bot_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
