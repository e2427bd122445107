#![expect(
    clippy::module_name_repetitions,
    reason = "Error types include the module name to indicate their scope"
)]

use std::error::Error as StdError;
use std::fmt;

/// Gateway error variants.
#[non_exhaustive]
#[derive(Debug)]
pub enum GatewayError {
    /// Error connecting to or communicating with the gateway
    Connection(tokio_tungstenite::tungstenite::Error),
    /// The post-connect handshake did not yield a channel object
    Handshake(serde_json::Error),
    /// The connection closed before the handshake completed
    HandshakeClosed,
    /// The gateway connection was closed
    ConnectionClosed,
    /// A transport ping could not be answered within the configured deadline
    KeepAliveTimeout,
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection(e) => write!(f, "gateway connection error: {e}"),
            Self::Handshake(e) => write!(f, "gateway handshake failed: {e}"),
            Self::HandshakeClosed => write!(f, "gateway closed before handshake completed"),
            Self::ConnectionClosed => write!(f, "gateway connection closed"),
            Self::KeepAliveTimeout => write!(f, "failed to answer gateway ping within deadline"),
        }
    }
}

impl StdError for GatewayError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Connection(e) => Some(e),
            Self::Handshake(e) => Some(e),
            _ => None,
        }
    }
}

// Integration with main Error type
impl From<GatewayError> for crate::error::Error {
    fn from(e: GatewayError) -> Self {
        crate::error::Error::with_source(crate::error::Kind::WebSocket, e)
    }
}
