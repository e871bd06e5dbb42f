//! Database Layer
//!
//! SQLite connection pool and embedded migrations. SQLite is the bundled
//! backend for the document collections (bots, quotes, rooms, authorized
//! users); all ensure/union-style writes go through `INSERT OR IGNORE` so
//! concurrent first contact converges on one record.

use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{info, warn};

mod models;

pub use models::*;

/// Connection attempts before startup gives up.
const MAX_CONNECT_ATTEMPTS: u32 = 5;

/// Create the SQLite connection pool, retrying with bounded backoff.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    // An in-memory database exists per connection; the pool must hold a
    // single connection for every query to see the same data.
    let max_connections = if database_url.contains(":memory:") {
        1
    } else {
        10
    };

    let mut attempt: u32 = 0;
    loop {
        match SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options.clone())
            .await
        {
            Ok(pool) => {
                info!("Connected to SQLite");
                return Ok(pool);
            }
            Err(e) if attempt + 1 < MAX_CONNECT_ATTEMPTS => {
                attempt += 1;
                let backoff_secs = 1u64 << attempt; // 2, 4, 8, 16
                warn!(
                    attempt,
                    backoff_secs, "Database connect failed, retrying: {}", e
                );
                tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Run database migrations.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations completed");
    Ok(())
}

/// Fresh in-memory pool with the schema applied, for unit tests.
#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = create_pool("sqlite::memory:")
        .await
        .expect("in-memory pool");
    run_migrations(&pool).await.expect("migrations");
    pool
}
