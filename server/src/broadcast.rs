//! Broadcast Fan-out
//!
//! One random quote per tenant, fanned out to its rooms through the outbox.
//! Sends to different rooms are independent; a failure in one never blocks
//! the rest, and nothing here escalates to the caller's acknowledgment.

use tracing::{error, info};

use crate::db::Bot;
use crate::quotes::{QuoteError, QuoteStore};
use crate::rooms::RoomSubscriptionManager;
use crate::transport::outbox::{Outbox, OutboundMessage};

/// Fan-out of quotes to tenant rooms.
#[derive(Clone)]
pub struct Broadcaster {
    quotes: QuoteStore,
    rooms: RoomSubscriptionManager,
    outbox: Outbox,
}

impl Broadcaster {
    /// Create a broadcaster over the given components.
    #[must_use]
    pub const fn new(quotes: QuoteStore, rooms: RoomSubscriptionManager, outbox: Outbox) -> Self {
        Self {
            quotes,
            rooms,
            outbox,
        }
    }

    /// Queue one random quote for every room of the tenant, narrowed to
    /// daily opt-ins when `only_daily_opted`. Returns the number of sends
    /// queued. Having no quotes is a logged no-op, not a fault; storage
    /// failures are logged and produce no sends.
    pub async fn broadcast(&self, bot: &Bot, only_daily_opted: bool) -> usize {
        let quote = match self.quotes.get_random(&bot.id, "").await {
            Ok(quote) => quote,
            Err(QuoteError::NoQuoteFound) => {
                info!(bot_id = %bot.id, "No quotes to broadcast");
                return 0;
            }
            Err(e) => {
                error!(bot_id = %bot.id, "Failed to pick a broadcast quote: {}", e);
                return 0;
            }
        };

        let rooms = match self
            .rooms
            .rooms_for_broadcast(&bot.id, only_daily_opted)
            .await
        {
            Ok(rooms) => rooms,
            Err(e) => {
                error!(bot_id = %bot.id, "Failed to list rooms for broadcast: {}", e);
                return 0;
            }
        };

        let count = rooms.len();
        for room in rooms {
            self.outbox
                .send(OutboundMessage::new(
                    &bot.access_token,
                    &room.room_id,
                    &quote.text,
                ))
                .await;
        }
        if count > 0 {
            info!(bot_id = %bot.id, rooms = count, "Broadcast queued");
        }
        count
    }

    /// Queue one random quote (optionally filtered by `search`) for a
    /// single room.
    pub async fn send_random(
        &self,
        bot: &Bot,
        room_id: &str,
        search: &str,
    ) -> Result<(), QuoteError> {
        let quote = self.quotes.get_random(&bot.id, search).await?;
        self.outbox
            .send(OutboundMessage::new(
                &bot.access_token,
                room_id,
                &quote.text,
            ))
            .await;
        Ok(())
    }
}
