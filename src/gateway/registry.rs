//! Type-keyed handler tables and fire-and-forget dispatch.
//!
//! The registry replaces runtime-typed handler storage with a closed set of
//! event-payload variants: one statically-typed callback list per variant,
//! selected through the sealed [`EventPayload`] trait. Dispatch spawns every
//! matching handler as an independent detached task — no join, no completion
//! signal, no ordering guarantee across frames.

use std::sync::Arc;

use futures::future::BoxFuture;

use super::events::{self, Event, HeartbeatAck, MessageCreated, TicketClaimed, TicketClosed};
use crate::client::Client;

/// A registered event handler. Receives the originating client handle plus the
/// decoded payload.
pub(crate) type Callback<T> = Arc<dyn Fn(Client, T) -> BoxFuture<'static, ()> + Send + Sync>;

/// The closed set of dispatchable event kinds.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    MessageCreated,
    TicketClaimed,
    TicketClosed,
    HeartbeatAck,
}

impl EventKind {
    /// Map a wire tag (including legacy spellings) to an event kind.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            events::MESSAGE_CREATE => Some(Self::MessageCreated),
            events::TICKET_CLAIMED | events::TICKET_CLAIMED_LEGACY => Some(Self::TicketClaimed),
            events::TICKET_CLOSED | events::TICKET_CLOSED_LEGACY => Some(Self::TicketClosed),
            events::HEARTBEAT_ACK => Some(Self::HeartbeatAck),
            _ => None,
        }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::MessageCreated {}
    impl Sealed for super::TicketClaimed {}
    impl Sealed for super::TicketClosed {}
    impl Sealed for super::HeartbeatAck {}
}

/// A payload variant that handlers can be registered for.
///
/// Sealed: the variant set is closed by design, so registration is checked at
/// compile time instead of through reflection.
pub trait EventPayload: sealed::Sealed + Clone + Send + 'static {
    const KIND: EventKind;

    #[doc(hidden)]
    fn slot_mut(registry: &mut HandlerRegistry) -> &mut Vec<Callback<Self>>;

    #[doc(hidden)]
    fn into_event(self) -> Event;
}

impl EventPayload for MessageCreated {
    const KIND: EventKind = EventKind::MessageCreated;

    fn slot_mut(registry: &mut HandlerRegistry) -> &mut Vec<Callback<Self>> {
        &mut registry.message_created
    }

    fn into_event(self) -> Event {
        Event::MessageCreated(self)
    }
}

impl EventPayload for TicketClaimed {
    const KIND: EventKind = EventKind::TicketClaimed;

    fn slot_mut(registry: &mut HandlerRegistry) -> &mut Vec<Callback<Self>> {
        &mut registry.ticket_claimed
    }

    fn into_event(self) -> Event {
        Event::TicketClaimed(self)
    }
}

impl EventPayload for TicketClosed {
    const KIND: EventKind = EventKind::TicketClosed;

    fn slot_mut(registry: &mut HandlerRegistry) -> &mut Vec<Callback<Self>> {
        &mut registry.ticket_closed
    }

    fn into_event(self) -> Event {
        Event::TicketClosed(self)
    }
}

impl EventPayload for HeartbeatAck {
    const KIND: EventKind = EventKind::HeartbeatAck;

    fn slot_mut(registry: &mut HandlerRegistry) -> &mut Vec<Callback<Self>> {
        &mut registry.heartbeat_ack
    }

    fn into_event(self) -> Event {
        Event::HeartbeatAck(self)
    }
}

/// Per-variant handler lists, invoked in registration order.
#[derive(Default)]
pub struct HandlerRegistry {
    message_created: Vec<Callback<MessageCreated>>,
    ticket_claimed: Vec<Callback<TicketClaimed>>,
    ticket_closed: Vec<Callback<TicketClosed>>,
    heartbeat_ack: Vec<Callback<HeartbeatAck>>,
}

impl HandlerRegistry {
    /// Append a handler to the list for its payload variant.
    pub(crate) fn register<E: EventPayload>(&mut self, callback: Callback<E>) {
        E::slot_mut(self).push(callback);
    }

    /// Total number of registered handlers across all variants.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.message_created.len()
            + self.ticket_claimed.len()
            + self.ticket_closed.len()
            + self.heartbeat_ack.len()
    }

    /// Spawn every handler registered for the event's concrete variant.
    ///
    /// No handlers for the variant (or an unrecognized event) is a no-op.
    pub(crate) fn dispatch(&self, client: &Client, event: Event) {
        match event {
            Event::MessageCreated(payload) => Self::fan_out(&self.message_created, client, payload),
            Event::TicketClaimed(payload) => Self::fan_out(&self.ticket_claimed, client, payload),
            Event::TicketClosed(payload) => Self::fan_out(&self.ticket_closed, client, payload),
            Event::HeartbeatAck(payload) => Self::fan_out(&self.heartbeat_ack, client, payload),
            Event::Unrecognized(_) => {}
        }
    }

    fn fan_out<T: Clone + Send + 'static>(handlers: &[Callback<T>], client: &Client, payload: T) {
        for handler in handlers {
            let handler = Arc::clone(handler);
            let client = client.clone();
            let payload = payload.clone();
            // Detached on purpose: a slow or panicking handler must never
            // stall the read loop or its sibling handlers.
            tokio::spawn(async move { handler(client, payload).await });
        }
    }
}
