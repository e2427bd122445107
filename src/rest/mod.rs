//! Outbound REST surface.
//!
//! The gateway only ever pushes events toward the bot; everything the bot
//! sends back (creating tickets, replying to messages, listing categories)
//! goes through these authenticated HTTP calls. Calls are independent of the
//! websocket connection state and are never retried automatically.

mod client;
pub mod types;

pub use client::Client;
