#![expect(
    clippy::module_name_repetitions,
    reason = "Connection types expose their domain in the name for clarity"
)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use backoff::backoff::{Backoff as _, Constant};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt as _, StreamExt as _};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use url::Url;

use super::config::Config;
use super::error::GatewayError;
use super::events;
use crate::client::Client;
use crate::types::Channel;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Connection state tracking.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected. Terminal once reconnection attempts are exhausted
    Disconnected,
    /// Attempting to open the socket
    Connecting,
    /// Socket open, waiting for the channel handshake
    AwaitingHandshake,
    /// Successfully connected
    Connected {
        /// When the connection was established
        since: Instant,
    },
    /// Reconnecting after a read failure
    Reconnecting {
        /// Current reconnection attempt number
        attempt: u32,
    },
}

impl ConnectionState {
    /// Check if the connection is currently active.
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected { .. })
    }
}

/// Owns the gateway connection lifecycle: dial, handshake, reader hand-off,
/// and the bounded fixed-interval reconnection state machine.
///
/// The socket handle is owned exclusively by the manager/reader pair. The
/// reader observes failures and signals them upward through
/// [`ConnectionManager::begin_reconnect`]; it never replaces the socket itself.
pub(crate) struct ConnectionManager {
    endpoint: Url,
    pub(crate) config: Config,
    state_tx: watch::Sender<ConnectionState>,
    state_rx: watch::Receiver<ConnectionState>,
    channel_tx: watch::Sender<Option<Channel>>,
    channel_rx: watch::Receiver<Option<Channel>>,
    /// Exactly one reconnection cycle per failure
    reconnecting: AtomicBool,
}

impl ConnectionManager {
    pub(crate) fn new(endpoint: Url, config: Config) -> Self {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        let (channel_tx, channel_rx) = watch::channel(None);

        Self {
            endpoint,
            config,
            state_tx,
            state_rx,
            channel_tx,
            channel_rx,
            reconnecting: AtomicBool::new(false),
        }
    }

    /// Get the current connection state.
    pub(crate) fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Snapshot of the channel received by the most recent handshake.
    pub(crate) fn channel(&self) -> Option<Channel> {
        self.channel_rx.borrow().clone()
    }

    pub(crate) fn mark_disconnected(&self) {
        _ = self.state_tx.send(ConnectionState::Disconnected);
    }

    /// One full connect attempt: dial, handshake, then hand the live socket to
    /// a freshly spawned reader task.
    ///
    /// Any dial, read, or decode failure fails the whole attempt; the handshake
    /// is never retried independently of the outer reconnection loop.
    pub(crate) async fn connect(&self, client: Client) -> crate::Result<Channel> {
        _ = self.state_tx.send(ConnectionState::Connecting);
        tracing::debug!(host = %self.endpoint.host_str().unwrap_or_default(), "dialing gateway");

        let (ws_stream, _) = connect_async(self.endpoint.as_str())
            .await
            .map_err(GatewayError::Connection)?;

        _ = self.state_tx.send(ConnectionState::AwaitingHandshake);
        let (mut write, mut read) = ws_stream.split();

        let channel = handshake(self.config.ping_deadline, &mut write, &mut read).await?;

        _ = self.channel_tx.send(Some(channel.clone()));
        _ = self.state_tx.send(ConnectionState::Connected {
            since: Instant::now(),
        });
        tracing::info!(channel = %channel.name, "gateway connected");

        client.spawn_on_connect(channel.clone());

        // The reader may fail at any point after it starts, so the reconnect
        // guard must be clear before the socket is handed over. Otherwise a
        // connection that dies right after the handshake would find the guard
        // still held by the finishing cycle and its failure would go unserved.
        self.reconnecting.store(false, Ordering::SeqCst);

        // The reader owns the socket for the lifetime of this connection
        // instance; a new connect spawns a new reader.
        tokio::spawn(read_loop(client, write, read));

        Ok(channel)
    }

    /// Start one reconnection cycle unless one is already running.
    ///
    /// Each tick waits the configured interval and then attempts a full
    /// connect. Failed attempts are swallowed and counted; success or
    /// exhaustion of the attempt bound ends the cycle. Exhaustion leaves the
    /// client permanently [`ConnectionState::Disconnected`].
    pub(crate) fn begin_reconnect(&self, client: Client) {
        if self.reconnecting.swap(true, Ordering::SeqCst) {
            return;
        }

        tokio::spawn(async move {
            let manager = client.manager();
            let max_attempts = manager.config.reconnect.max_attempts;
            let mut backoff: Constant = manager.config.reconnect.clone().into();
            let mut attempt = 0_u32;

            loop {
                if let Some(max) = max_attempts
                    && attempt >= max
                {
                    tracing::error!(attempts = attempt, "reconnection attempts exhausted");
                    manager.mark_disconnected();
                    manager.reconnecting.store(false, Ordering::SeqCst);
                    break;
                }

                attempt = attempt.saturating_add(1);
                _ = manager.state_tx.send(ConnectionState::Reconnecting { attempt });

                if let Some(delay) = backoff.next_backoff() {
                    sleep(delay).await;
                }

                // A successful connect releases the guard itself, before the
                // new reader starts; the next failure begins a fresh cycle
                // even if this task has not observed the success yet.
                match manager.connect(client.clone()).await {
                    Ok(channel) => {
                        tracing::info!(channel = %channel.name, attempt, "gateway reconnected");
                        break;
                    }
                    Err(e) => {
                        tracing::warn!(attempt, error = %e, "reconnect attempt failed");
                    }
                }
            }
        });
    }
}

/// One expected reply: the channel object identifying the authenticated target.
///
/// Transport control frames may precede the handshake payload and are answered
/// or skipped; the first data frame must decode as a [`Channel`].
async fn handshake(
    ping_deadline: std::time::Duration,
    write: &mut WsSink,
    read: &mut WsSource,
) -> crate::Result<Channel> {
    loop {
        match read.next().await {
            Some(Ok(Message::Text(text))) => {
                return serde_json::from_str(text.as_str())
                    .map_err(|e| GatewayError::Handshake(e).into());
            }
            Some(Ok(Message::Binary(data))) => {
                return serde_json::from_slice(&data)
                    .map_err(|e| GatewayError::Handshake(e).into());
            }
            Some(Ok(Message::Ping(data))) => {
                answer_ping(ping_deadline, write, data).await?;
            }
            Some(Ok(Message::Close(_))) | None => {
                return Err(GatewayError::HandshakeClosed.into());
            }
            Some(Ok(_)) => {
                // Unsolicited pongs and raw frames are irrelevant here.
            }
            Some(Err(e)) => return Err(GatewayError::Connection(e).into()),
        }
    }
}

async fn answer_ping(
    ping_deadline: std::time::Duration,
    write: &mut WsSink,
    data: tokio_tungstenite::tungstenite::Bytes,
) -> Result<(), GatewayError> {
    match timeout(ping_deadline, write.send(Message::Pong(data))).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(GatewayError::Connection(e)),
        Err(_) => Err(GatewayError::KeepAliveTimeout),
    }
}

/// The single sequential receive loop for one connection instance.
///
/// Frames are processed strictly in arrival order. Decode failures drop the
/// frame and keep the connection open; transport failures end the reader and
/// start exactly one reconnection cycle.
async fn read_loop(client: Client, mut write: WsSink, mut read: WsSource) {
    let ping_deadline = client.manager().config.ping_deadline;

    let failure = loop {
        match read.next().await {
            Some(Ok(Message::Text(text))) => match events::decode(text.as_bytes()) {
                Ok(event) => client.dispatch(event),
                Err(e) => {
                    tracing::warn!(error = %e, "dropping undecodable gateway frame");
                }
            },
            Some(Ok(Message::Ping(data))) => {
                if let Err(e) = answer_ping(ping_deadline, &mut write, data).await {
                    break e;
                }
            }
            Some(Ok(Message::Close(_))) => break GatewayError::ConnectionClosed,
            Some(Ok(_)) => {
                // Binary frames and unsolicited pongs are ignored.
            }
            Some(Err(e)) => break GatewayError::Connection(e),
            None => break GatewayError::ConnectionClosed,
        }
    };

    tracing::warn!(error = %failure, "gateway read failed, starting reconnection");

    // Dropping both halves closes the socket.
    drop(write);
    drop(read);

    client.spawn_on_disconnect();
    client.manager().begin_reconnect(client.clone());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_connected_counts_as_connected() {
        assert!(
            ConnectionState::Connected {
                since: Instant::now()
            }
            .is_connected()
        );
        assert!(!ConnectionState::Disconnected.is_connected());
        assert!(!ConnectionState::Connecting.is_connected());
        assert!(!ConnectionState::AwaitingHandshake.is_connected());
        assert!(!ConnectionState::Reconnecting { attempt: 3 }.is_connected());
    }
}
