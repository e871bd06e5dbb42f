//! Command Dispatch
//!
//! Parses inbound message text into a closed command set and routes each
//! command to storage or broadcast operations. Storage and transport
//! failures inside a branch are logged, never raised: by the time a command
//! runs, the webhook has been authenticated and will be acknowledged
//! regardless of what its side effects do.

use tracing::{debug, error, warn};

use crate::broadcast::Broadcaster;
use crate::db::Bot;
use crate::quotes::{QuoteError, QuoteStore};
use crate::rooms::{RoomError, RoomSubscriptionManager};
use crate::transport::outbox::{Outbox, OutboundMessage};
use crate::users::UserDirectory;

const ADDED_REPLY: &str = "Quote added.";
const REJECTED_REPLY: &str = "You are not allowed to add quotes for this bot.";
const EMPTY_ADD_REPLY: &str = "There is nothing to add.";
const NO_MATCH_REPLY: &str = "No quote found for that search.";
const DAILY_ON_REPLY: &str = "Daily quotes are now on for this room.";
const DAILY_OFF_REPLY: &str = "Daily quotes are now off for this room.";

/// Command names and descriptions, in the order `help` lists them.
const COMMANDS: &[(&str, &str)] = &[
    (".add <text>", "store a new quote"),
    (".get [search]", "fetch a random quote, optionally filtered"),
    (".daily", "toggle daily quote delivery for this room"),
    (".help", "list the available commands"),
];

/// A parsed chat command. The set is closed: adding a command means adding
/// a variant and the compiler walks every handler site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Bare mention: send one random quote to the originating room.
    Quote,
    /// Store a quote.
    Add(String),
    /// Fetch a random quote matching a search term.
    Get(String),
    /// Flip the room's daily-broadcast flag.
    Daily,
    /// List the available commands.
    Help,
}

impl Command {
    /// Parse a message body. The first token is the bot mention and is
    /// ignored; the second is the verb (an optional leading `.` is
    /// accepted); the rest, joined with single spaces, is the argument.
    /// Unrecognized verbs parse to `None` and are a deliberate no-op.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        match tokens.as_slice() {
            [] => None,
            [_mention] => Some(Self::Quote),
            [_mention, verb, rest @ ..] => {
                let argument = rest.join(" ");
                match verb.strip_prefix('.').unwrap_or(verb) {
                    "add" => Some(Self::Add(argument)),
                    "get" => Some(Self::Get(argument)),
                    "daily" => Some(Self::Daily),
                    "help" => Some(Self::Help),
                    _ => None,
                }
            }
        }
    }
}

/// Routes parsed commands to the tenant-scoped components.
#[derive(Clone)]
pub struct Dispatcher {
    quotes: QuoteStore,
    rooms: RoomSubscriptionManager,
    users: UserDirectory,
    broadcaster: Broadcaster,
    outbox: Outbox,
}

impl Dispatcher {
    /// Create a dispatcher over the given components.
    #[must_use]
    pub const fn new(
        quotes: QuoteStore,
        rooms: RoomSubscriptionManager,
        users: UserDirectory,
        broadcaster: Broadcaster,
        outbox: Outbox,
    ) -> Self {
        Self {
            quotes,
            rooms,
            users,
            broadcaster,
            outbox,
        }
    }

    /// Handle one authenticated inbound message.
    pub async fn dispatch(&self, bot: &Bot, room_id: &str, person_id: &str, text: &str) {
        // First contact establishes the room with daily delivery on.
        if let Err(e) = self.rooms.ensure_room(&bot.id, room_id).await {
            error!(bot_id = %bot.id, room_id = %room_id, "Failed to establish room: {}", e);
        }

        let Some(command) = Command::parse(text) else {
            debug!(bot_id = %bot.id, "Ignoring unrecognized command");
            return;
        };

        match command {
            Command::Quote => self.respond_with_quote(bot, room_id, "").await,
            Command::Get(search) => self.respond_with_quote(bot, room_id, &search).await,
            Command::Add(quote_text) => self.handle_add(bot, room_id, person_id, &quote_text).await,
            Command::Daily => self.handle_daily(bot, room_id).await,
            Command::Help => self.reply(bot, room_id, &help_text()).await,
        }
    }

    /// `.get` and the bare mention: one random quote, or a notice when
    /// nothing matches. The response is never silently dropped.
    async fn respond_with_quote(&self, bot: &Bot, room_id: &str, search: &str) {
        match self.broadcaster.send_random(bot, room_id, search).await {
            Ok(()) => {}
            Err(QuoteError::NoQuoteFound) => self.reply(bot, room_id, NO_MATCH_REPLY).await,
            Err(e) => error!(bot_id = %bot.id, "Failed to fetch a quote: {}", e),
        }
    }

    /// `.add`: store the quote and acknowledge, or reject. Either the quote
    /// is stored and acknowledged or neither happens.
    async fn handle_add(&self, bot: &Bot, room_id: &str, person_id: &str, quote_text: &str) {
        if bot.auth_required {
            match self.users.is_authorized(person_id, &bot.id).await {
                Ok(true) => {}
                Ok(false) => {
                    self.reply(bot, room_id, REJECTED_REPLY).await;
                    return;
                }
                Err(e) => {
                    error!(bot_id = %bot.id, person_id = %person_id, "Authorization check failed: {}", e);
                    return;
                }
            }
        }

        match self.quotes.add(quote_text, &bot.id).await {
            Ok(_) => self.reply(bot, room_id, ADDED_REPLY).await,
            Err(QuoteError::EmptyText) => self.reply(bot, room_id, EMPTY_ADD_REPLY).await,
            Err(e) => error!(bot_id = %bot.id, "Failed to store quote: {}", e),
        }
    }

    /// `.daily`: flip the room's flag and echo the new state.
    async fn handle_daily(&self, bot: &Bot, room_id: &str) {
        match self.rooms.toggle_daily(&bot.id, room_id, None).await {
            Ok(true) => self.reply(bot, room_id, DAILY_ON_REPLY).await,
            Ok(false) => self.reply(bot, room_id, DAILY_OFF_REPLY).await,
            Err(RoomError::NotFound) => {
                // ensure_room ran above; only a storage race can get here.
                warn!(bot_id = %bot.id, room_id = %room_id, "Toggle on a room that vanished");
            }
            Err(e) => error!(bot_id = %bot.id, "Failed to toggle daily flag: {}", e),
        }
    }

    async fn reply(&self, bot: &Bot, room_id: &str, text: &str) {
        self.outbox
            .send(OutboundMessage::new(&bot.access_token, room_id, text))
            .await;
    }
}

/// Static, ordered command list for `.help`.
fn help_text() -> String {
    let mut lines = vec!["Commands:".to_string()];
    for (name, description) in COMMANDS {
        lines.push(format!("{name}: {description}"));
    }
    lines.join("\n")
}
