//! Quotebot Server
//!
//! Multi-tenant quote bot backend: authenticated webhook ingress, command
//! dispatch, tenant-scoped quote storage, room subscriptions, and scheduled
//! daily broadcasts.

pub mod api;
pub mod bots;
pub mod broadcast;
pub mod config;
pub mod db;
pub mod dispatch;
pub mod quotes;
pub mod rooms;
pub mod scheduler;
pub mod seed;
pub mod transport;
pub mod users;
pub mod webhook;
