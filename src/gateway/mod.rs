//! Gateway connection core.
//!
//! This module owns everything with real state and failure-recovery concerns:
//!
//! - [`connection`]: dial, handshake, and the reconnection state machine
//! - [`events`]: the envelope codec and the closed set of event variants
//! - [`registry::HandlerRegistry`]: per-variant handler tables and fire-and-forget dispatch
//!
//! The read loop processes inbound frames strictly in arrival order, but each
//! dispatched handler runs as its own detached task: there is no ordering and no
//! backpressure across handler executions.

pub mod config;
pub mod connection;
pub mod error;
pub mod events;
pub mod registry;

pub use connection::ConnectionState;
pub use error::GatewayError;
pub use events::{Event, Sender};
