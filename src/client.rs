//! The public client handle: registration, connection, and REST access.

use std::sync::{Arc, PoisonError, RwLock};

use futures::future::BoxFuture;

use crate::error::Error;
use crate::gateway::config::Config;
use crate::gateway::connection::{ConnectionManager, ConnectionState};
use crate::gateway::events::{
    Event, HeartbeatAck, MessageCreated, TicketClaimed, TicketClosed,
};
use crate::gateway::registry::{Callback, EventKind, EventPayload, HandlerRegistry};
use crate::rest;
use crate::rest::types::{CreateTicket, OutgoingMessage};
use crate::types::{Category, Channel};
use crate::{Environment, gateway_endpoint};

type ConnectHook = Arc<dyn Fn(Client, Channel) -> BoxFuture<'static, ()> + Send + Sync>;
type DisconnectHook = Arc<dyn Fn(Client) -> BoxFuture<'static, ()> + Send + Sync>;

/// Handle to one iocket bot session.
///
/// Cheap to clone; every clone shares the same connection, handler registry,
/// and REST client. Handlers receive a clone, so they can call back into the
/// SDK (for example to send a reply over REST) without further setup.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    manager: ConnectionManager,
    registry: RwLock<HandlerRegistry>,
    rest: rest::Client,
    on_connect: RwLock<Option<ConnectHook>>,
    on_disconnect: RwLock<Option<DisconnectHook>>,
}

impl Client {
    /// Create a client for the given deployment. Performs no I/O.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty token, or an internal error if
    /// the REST client cannot be constructed.
    pub fn new(token: &str, environment: Environment, config: Config) -> crate::Result<Self> {
        Self::with_endpoints(
            token,
            environment.gateway_url(),
            environment.rest_url(),
            config,
        )
    }

    /// Create a client against explicit gateway and REST endpoints.
    ///
    /// Useful for pointing the SDK at a non-default deployment.
    pub fn with_endpoints(
        token: &str,
        gateway_url: &str,
        rest_url: &str,
        config: Config,
    ) -> crate::Result<Self> {
        if token.is_empty() {
            return Err(Error::validation("bot token must not be empty"));
        }

        let endpoint = gateway_endpoint(gateway_url, token)?;
        let rest = rest::Client::new(token, rest_url)?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                manager: ConnectionManager::new(endpoint, config),
                registry: RwLock::new(HandlerRegistry::default()),
                rest,
                on_connect: RwLock::new(None),
                on_disconnect: RwLock::new(None),
            }),
        })
    }

    /// Connect to the gateway and wait for the channel handshake.
    ///
    /// On success a background reader keeps dispatching events until the
    /// connection drops, at which point reconnection takes over. Register
    /// handlers before calling this; frames that arrive earlier than a
    /// handler's registration are not replayed.
    ///
    /// Only valid while fully disconnected. Calling it while connected, or
    /// while a reconnection cycle is in flight, is rejected; two concurrent
    /// connections would fight over the shared session state.
    pub async fn connect(&self) -> crate::Result<Channel> {
        if self.state() != ConnectionState::Disconnected {
            return Err(Error::validation("client is already connected"));
        }

        match self.inner.manager.connect(self.clone()).await {
            Ok(channel) => Ok(channel),
            Err(e) => {
                self.inner.manager.mark_disconnected();
                Err(e)
            }
        }
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.inner.manager.state()
    }

    /// The channel delivered by the most recent successful handshake.
    ///
    /// This is a snapshot: it stays readable while the gateway reconnects and
    /// is replaced when the next handshake completes. `None` until the first
    /// connect succeeds.
    #[must_use]
    pub fn channel(&self) -> Option<Channel> {
        self.inner.manager.channel()
    }

    /// Register a handler for new ticket messages.
    ///
    /// Handlers run fire-and-forget: each matching frame spawns the handler as
    /// a detached task, with no ordering across frames and no backpressure.
    pub fn on_message_created<F, Fut>(&self, handler: F)
    where
        F: Fn(Client, MessageCreated) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.register(handler);
    }

    /// Register a handler for ticket claims.
    pub fn on_ticket_claimed<F, Fut>(&self, handler: F)
    where
        F: Fn(Client, TicketClaimed) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.register(handler);
    }

    /// Register a handler for ticket closures.
    pub fn on_ticket_closed<F, Fut>(&self, handler: F)
    where
        F: Fn(Client, TicketClosed) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.register(handler);
    }

    /// Register a handler for heartbeat acknowledgements.
    pub fn on_heartbeat_ack<F, Fut>(&self, handler: F)
    where
        F: Fn(Client, HeartbeatAck) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.register(handler);
    }

    /// Register an [`Event`]-level handler by wire tag.
    ///
    /// Accepts legacy tag spellings. The typed `on_*` methods are preferred;
    /// this exists for callers that route on tag strings.
    ///
    /// # Errors
    ///
    /// Returns a registration error if the tag names no known event.
    pub fn on_event<F, Fut>(&self, tag: &str, handler: F) -> crate::Result<()>
    where
        F: Fn(Client, Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let Some(kind) = EventKind::from_tag(tag) else {
            tracing::warn!(tag, "cannot register handler for unknown event tag");
            return Err(Error::registration(tag));
        };

        let handler = Arc::new(handler);
        match kind {
            EventKind::MessageCreated => self.register(move |client, payload: MessageCreated| {
                let handler = Arc::clone(&handler);
                async move { handler(client, payload.into_event()).await }
            }),
            EventKind::TicketClaimed => self.register(move |client, payload: TicketClaimed| {
                let handler = Arc::clone(&handler);
                async move { handler(client, payload.into_event()).await }
            }),
            EventKind::TicketClosed => self.register(move |client, payload: TicketClosed| {
                let handler = Arc::clone(&handler);
                async move { handler(client, payload.into_event()).await }
            }),
            EventKind::HeartbeatAck => self.register(move |client, payload: HeartbeatAck| {
                let handler = Arc::clone(&handler);
                async move { handler(client, payload.into_event()).await }
            }),
        }

        Ok(())
    }

    /// Set the hook invoked after every successful handshake, including
    /// reconnects. Replaces any previous hook.
    pub fn on_connect<F, Fut>(&self, hook: F)
    where
        F: Fn(Client, Channel) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let hook: ConnectHook = Arc::new(move |client, channel| Box::pin(hook(client, channel)));
        *self
            .inner
            .on_connect
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(hook);
    }

    /// Set the hook invoked when the connection is lost. Replaces any previous
    /// hook.
    pub fn on_disconnect<F, Fut>(&self, hook: F)
    where
        F: Fn(Client) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let hook: DisconnectHook = Arc::new(move |client| Box::pin(hook(client)));
        *self
            .inner
            .on_disconnect
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(hook);
    }

    /// Total number of registered event handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.inner
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .handler_count()
    }

    /// Create a ticket.
    pub async fn create_ticket(&self, ticket: &CreateTicket) -> crate::Result<()> {
        self.inner.rest.create_ticket(ticket).await
    }

    /// List the channel's ticket categories.
    pub async fn categories(&self) -> crate::Result<Vec<Category>> {
        self.inner.rest.categories().await
    }

    /// Send a message into an existing ticket.
    pub async fn send_message(&self, message: &OutgoingMessage) -> crate::Result<()> {
        self.inner.rest.send_message(message).await
    }

    fn register<E, F, Fut>(&self, handler: F)
    where
        E: EventPayload,
        F: Fn(Client, E) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let callback: Callback<E> = Arc::new(move |client, payload| {
            Box::pin(handler(client, payload))
        });
        self.inner
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .register(callback);
    }

    pub(crate) fn manager(&self) -> &ConnectionManager {
        &self.inner.manager
    }

    pub(crate) fn dispatch(&self, event: Event) {
        self.inner
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .dispatch(self, event);
    }

    pub(crate) fn spawn_on_connect(&self, channel: Channel) {
        let hook = self
            .inner
            .on_connect
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(hook) = hook {
            let client = self.clone();
            tokio::spawn(async move { hook(client, channel).await });
        }
    }

    pub(crate) fn spawn_on_disconnect(&self) {
        let hook = self
            .inner
            .on_disconnect
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(hook) = hook {
            let client = self.clone();
            tokio::spawn(async move { hook(client).await });
        }
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("state", &self.state())
            .field("handlers", &self.handler_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Kind;

    fn test_client() -> Client {
        Client::new("test-token", Environment::Local, Config::default()).expect("client")
    }

    #[test]
    fn empty_token_is_rejected() {
        let error = Client::new("", Environment::Local, Config::default()).expect_err("must fail");
        assert_eq!(error.kind(), Kind::Validation);
    }

    #[test]
    fn new_client_starts_disconnected() {
        let client = test_client();
        assert_eq!(client.state(), ConnectionState::Disconnected);
        assert!(client.channel().is_none());
        assert_eq!(client.handler_count(), 0);
    }

    #[tokio::test]
    async fn typed_registration_grows_the_registry() {
        let client = test_client();

        client.on_message_created(|_, _| async {});
        client.on_ticket_closed(|_, _| async {});
        client.on_ticket_closed(|_, _| async {});

        assert_eq!(client.handler_count(), 3);
    }

    #[tokio::test]
    async fn tag_registration_accepts_legacy_spellings() {
        let client = test_client();

        client
            .on_event("CLAIM_TICKET", |_, _| async {})
            .expect("legacy tag");
        client
            .on_event("TICKET_CLOSED", |_, _| async {})
            .expect("current tag");

        assert_eq!(client.handler_count(), 2);
    }

    #[tokio::test]
    async fn tag_registration_rejects_unknown_tags() {
        let client = test_client();

        let error = client
            .on_event("MESSAGE_PINNED", |_, _| async {})
            .expect_err("must fail");

        assert_eq!(error.kind(), Kind::Registration);
        assert_eq!(client.handler_count(), 0);
    }
}
