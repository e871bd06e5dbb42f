//! Server Configuration
//!
//! Loads configuration from environment variables.

use anyhow::{Context, Result};
use chrono::NaiveTime;
use std::env;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:8081")
    pub bind_address: String,

    /// SQLite database URL
    pub database_url: String,

    /// Chat platform API base URL
    pub chat_api_url: String,

    /// UTC time of day for the scheduled broadcast (default: 13:00)
    pub broadcast_time: NaiveTime,

    /// Skip weekend broadcasts (default: true)
    pub broadcast_weekdays_only: bool,

    /// Optional JSON seed file loaded at startup
    pub seed_file: Option<String>,

    /// Outbound message queue capacity (default: 256)
    pub outbox_capacity: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let broadcast_time = env::var("BROADCAST_TIME").unwrap_or_else(|_| "13:00".into());
        Ok(Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8081".into()),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://quotebot.db".into()),
            chat_api_url: env::var("CHAT_API_URL")
                .unwrap_or_else(|_| "https://webexapis.com/v1".into()),
            broadcast_time: NaiveTime::parse_from_str(&broadcast_time, "%H:%M")
                .with_context(|| format!("BROADCAST_TIME must be HH:MM, got {broadcast_time}"))?,
            broadcast_weekdays_only: env::var("BROADCAST_WEEKDAYS_ONLY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            seed_file: env::var("SEED_FILE").ok(),
            outbox_capacity: env::var("OUTBOX_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(256),
        })
    }

    /// Create a default configuration for testing.
    #[must_use]
    pub fn default_for_test() -> Self {
        Self {
            bind_address: "127.0.0.1:8081".into(),
            database_url: "sqlite::memory:".into(),
            chat_api_url: "http://localhost:9999".into(),
            broadcast_time: NaiveTime::from_hms_opt(13, 0, 0).expect("valid time"),
            broadcast_weekdays_only: true,
            seed_file: None,
            outbox_capacity: 16,
        }
    }
}
