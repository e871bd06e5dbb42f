//! Seed Loading
//!
//! Optional bulk import of tenants, authorization grants, and quotes from a
//! JSON file at startup. The loader reuses the live upsert paths, so
//! reloading the same file is idempotent.

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use crate::bots::{BotError, BotRegistry};
use crate::db::Bot;
use crate::quotes::{QuoteError, QuoteStore};
use crate::users::UserDirectory;

/// Top-level seed file shape. Every collection is optional.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    bots: Vec<SeedBot>,
    #[serde(default)]
    users: Vec<SeedUser>,
    #[serde(default)]
    quotes: Vec<SeedQuote>,
}

#[derive(Debug, Deserialize)]
struct SeedBot {
    id: String,
    access_token: String,
    signing_secret: String,
    #[serde(default)]
    auth_required: bool,
}

#[derive(Debug, Deserialize)]
struct SeedUser {
    id: String,
    #[serde(default)]
    bots: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SeedQuote {
    text: String,
    #[serde(default)]
    owners: Vec<String>,
}

/// Read and apply a seed file.
pub async fn load(
    path: &str,
    registry: &BotRegistry,
    users: &UserDirectory,
    quotes: &QuoteStore,
) -> Result<()> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read seed file {path}"))?;
    let seed: SeedFile =
        serde_json::from_str(&raw).with_context(|| format!("Failed to parse seed file {path}"))?;
    apply(&seed, registry, users, quotes).await
}

/// Apply parsed seed data through the live upsert paths.
pub async fn apply(
    seed: &SeedFile,
    registry: &BotRegistry,
    users: &UserDirectory,
    quotes: &QuoteStore,
) -> Result<()> {
    for bot in &seed.bots {
        let record = Bot {
            id: bot.id.clone(),
            access_token: bot.access_token.clone(),
            signing_secret: bot.signing_secret.clone(),
            auth_required: bot.auth_required,
        };
        match registry.register(&record).await {
            Ok(()) | Err(BotError::AlreadyExists) => {}
            Err(e) => return Err(e.into()),
        }
    }

    for user in &seed.users {
        for bot_id in &user.bots {
            users.authorize(&user.id, bot_id).await?;
        }
    }

    let mut quote_count = 0usize;
    for quote in &seed.quotes {
        for owner in &quote.owners {
            match quotes.add(&quote.text, owner).await {
                Ok(_) => quote_count += 1,
                Err(QuoteError::EmptyText) => {
                    warn!("Skipping empty quote in seed file");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    info!(
        bots = seed.bots.len(),
        users = seed.users.len(),
        quotes = quote_count,
        "Seed data loaded"
    );
    Ok(())
}
