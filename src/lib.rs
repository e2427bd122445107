//! Realtime client SDK for the iocket ticketing/chat platform.
//!
//! The SDK maintains a persistent websocket gateway connection, authenticates
//! with a bot token, receives the initial [`types::Channel`] handshake, then
//! decodes inbound event frames and fans them out to registered handlers while
//! transparently recovering from connection loss. Delivery is at-most-once and
//! best-effort: handlers are spawned fire-and-forget with no ordering across
//! frames and no completion signal.
//!
//! # Example
//!
//! ```no_run
//! use iocket_client_sdk::{Client, Environment};
//! use iocket_client_sdk::gateway::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = Client::new("my-bot-token", Environment::Production, Config::default())?;
//!
//!     client.on_message_created(|_client, event| async move {
//!         println!("{}: {}", event.id, event.message.content);
//!     });
//!
//!     let channel = client.connect().await?;
//!     println!("connected to {}", channel.name);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod gateway;
pub mod rest;
pub mod types;

use url::Url;

pub use crate::client::Client;
use crate::error::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Timestamp in seconds since [`std::time::UNIX_EPOCH`]
pub(crate) type Timestamp = i64;

/// Which iocket deployment to talk to.
///
/// Selects both the gateway websocket scheme (`wss` for production, plain `ws`
/// for a local deployment) and the REST base URL.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Production,
    Local,
}

impl Environment {
    /// Base websocket URL of the gateway, without the token query parameter.
    #[must_use]
    pub const fn gateway_url(self) -> &'static str {
        match self {
            Self::Production => "wss://api.iocket.com/gateway",
            Self::Local => "ws://localhost:8080/gateway",
        }
    }

    /// Base URL of the REST API.
    #[must_use]
    pub const fn rest_url(self) -> &'static str {
        match self {
            Self::Production => "https://api.iocket.com",
            Self::Local => "http://localhost:8080",
        }
    }
}

/// Build the full gateway URL, attaching the bot token as a query parameter.
pub(crate) fn gateway_endpoint(base: &str, token: &str) -> Result<Url> {
    let mut url = Url::parse(base)?;
    url.query_pairs_mut().append_pair("token", token);
    Ok(url)
}
