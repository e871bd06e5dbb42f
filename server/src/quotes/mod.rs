//! Quote Store
//!
//! Content-addressed quote storage with tenant-scoped retrieval. Quotes are
//! deduplicated across tenants by the hash of their normalized text; each
//! tenant owns a subset via the `quote_owners` association, and retrieval
//! never crosses an ownership boundary.

use axum::http::StatusCode;
use rand::seq::SliceRandom;
use regex::{Regex, RegexBuilder};
use sqlx::SqlitePool;
use thiserror::Error;

use crate::db::Quote;

pub mod normalize;

/// Errors that can occur during quote operations.
#[derive(Error, Debug)]
pub enum QuoteError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    /// No quote matched the tenant and search filter. Expected and
    /// recoverable, not a fault.
    #[error("No quote found")]
    NoQuoteFound,
    /// Quote text was empty after normalization.
    #[error("Quote text is empty")]
    EmptyText,
}

impl From<QuoteError> for (StatusCode, String) {
    fn from(err: QuoteError) -> Self {
        match err {
            QuoteError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            QuoteError::NoQuoteFound => (StatusCode::NOT_FOUND, err.to_string()),
            QuoteError::EmptyText => (StatusCode::BAD_REQUEST, err.to_string()),
        }
    }
}

/// Tenant-scoped quote storage over the shared document store.
#[derive(Clone)]
pub struct QuoteStore {
    pool: SqlitePool,
}

impl QuoteStore {
    /// Create a store over the given pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a quote for a tenant.
    ///
    /// Normalizes the text, derives the content id, and upserts both the
    /// record and the tenant's ownership. Idempotent: re-adding equivalent
    /// text under any tenant only unions the owners set.
    pub async fn add(&self, text: &str, bot_id: &str) -> Result<Quote, QuoteError> {
        let normalized = normalize::normalize(text);
        if normalized.is_empty() {
            return Err(QuoteError::EmptyText);
        }
        let id = normalize::quote_id(&normalized);

        let mut tx = self.pool.begin().await?;
        sqlx::query("INSERT OR IGNORE INTO quotes (id, text) VALUES (?, ?)")
            .bind(&id)
            .bind(&normalized)
            .execute(&mut *tx)
            .await?;
        sqlx::query("INSERT OR IGNORE INTO quote_owners (quote_id, bot_id) VALUES (?, ?)")
            .bind(&id)
            .bind(bot_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(Quote {
            id,
            text: normalized,
        })
    }

    /// Pick a uniform random quote among those owned by the tenant whose
    /// text matches `search` case-insensitively. An empty search matches
    /// everything.
    pub async fn get_random(&self, bot_id: &str, search: &str) -> Result<Quote, QuoteError> {
        let owned: Vec<Quote> = sqlx::query_as(
            "SELECT q.id, q.text FROM quotes q \
             JOIN quote_owners o ON o.quote_id = q.id \
             WHERE o.bot_id = ?",
        )
        .bind(bot_id)
        .fetch_all(&self.pool)
        .await?;

        let filter = build_filter(search);
        let matching: Vec<Quote> = owned
            .into_iter()
            .filter(|q| filter.as_ref().is_none_or(|re| re.is_match(&q.text)))
            .collect();

        matching
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or(QuoteError::NoQuoteFound)
    }
}

/// Build the case-insensitive search filter. An invalid pattern degrades to
/// a literal substring match rather than erroring the lookup.
fn build_filter(search: &str) -> Option<Regex> {
    if search.is_empty() {
        return None;
    }
    RegexBuilder::new(search)
        .case_insensitive(true)
        .build()
        .or_else(|_| {
            RegexBuilder::new(&regex::escape(search))
                .case_insensitive(true)
                .build()
        })
        .ok()
}
