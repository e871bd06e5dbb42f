//! Scheduled Broadcast
//!
//! Background task that delivers one random quote to every daily-opted room
//! of every tenant at a configured time of day. Failures are logged and the
//! loop keeps running.

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc, Weekday};
use tracing::{error, info};

use crate::api::AppState;

/// Run the broadcast schedule forever.
pub async fn run(state: AppState) {
    info!("Broadcast scheduler started");
    loop {
        let now = Utc::now();
        let next = next_run(
            now,
            state.config.broadcast_time,
            state.config.broadcast_weekdays_only,
        );
        let delay = (next - now).to_std().unwrap_or_default();
        info!(next_run = %next, "Sleeping until next scheduled broadcast");
        tokio::time::sleep(delay).await;

        broadcast_all(&state).await;
    }
}

/// One broadcast round over every tenant.
async fn broadcast_all(state: &AppState) {
    let bots = match state.registry.list_all().await {
        Ok(bots) => bots,
        Err(e) => {
            error!("Failed to list bots for scheduled broadcast: {}", e);
            return;
        }
    };

    for bot in bots {
        state.broadcaster.broadcast(&bot, true).await;
    }
}

/// Next occurrence of `time` strictly after `after`, skipping weekends when
/// `weekdays_only` is set.
fn next_run(after: DateTime<Utc>, time: NaiveTime, weekdays_only: bool) -> DateTime<Utc> {
    let mut candidate = after.date_naive().and_time(time).and_utc();
    if candidate <= after {
        candidate += Duration::days(1);
    }
    while weekdays_only && matches!(candidate.weekday(), Weekday::Sat | Weekday::Sun) {
        candidate += Duration::days(1);
    }
    candidate
}
