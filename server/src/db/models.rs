//! Database Models

use serde::Serialize;
use sqlx::FromRow;

/// A tenant. One record per configured bot identity.
#[derive(Debug, Clone, FromRow)]
pub struct Bot {
    pub id: String,
    /// Bearer token for the chat platform API, held on behalf of the tenant.
    pub access_token: String,
    /// Secret used to verify inbound webhook signatures.
    pub signing_secret: String,
    /// Whether the quote-add command is restricted to authorized users.
    pub auth_required: bool,
}

/// A deduplicated quote. `id` is the SHA-256 hex digest of the normalized
/// text, so the same quote typed by any tenant or client is one record.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Quote {
    pub id: String,
    pub text: String,
}

/// Per-tenant room subscription state.
#[derive(Debug, Clone, FromRow)]
pub struct Room {
    pub room_id: String,
    pub daily: bool,
}
