//! Webhook Ingress
//!
//! Authenticated intake of chat-platform message events: HMAC signature
//! verification over the raw body, tenant resolution, and hand-off to the
//! command dispatcher.

pub mod handlers;
pub mod signing;
pub mod types;
