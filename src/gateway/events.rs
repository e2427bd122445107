//! Envelope codec: the generic wire frame and the closed set of event variants.
//!
//! Every inbound gateway frame is a JSON object `{"e": <tag>, "m": <payload>}`.
//! The tag fully determines the payload's shape. Unknown tags never abort the
//! stream: they decode to [`Event::Unrecognized`] so the SDK stays forward
//! compatible with server-introduced events.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::Timestamp;
use crate::error::{Error, Kind};
use crate::types::{Ticket, TicketClient};

pub const MESSAGE_CREATE: &str = "MESSAGE_CREATE";
pub const TICKET_CLAIMED: &str = "TICKET_CLAIMED";
pub const TICKET_CLAIMED_LEGACY: &str = "CLAIM_TICKET";
pub const TICKET_CLOSED: &str = "TICKET_CLOSED";
pub const TICKET_CLOSED_LEGACY: &str = "TICKET_CLOSE";
pub const HEARTBEAT_ACK: &str = "HEARTBEAT_ACK";

/// Wire-level frame: an event tag plus an opaque payload.
///
/// Transient — constructed per inbound frame and discarded after decode.
#[derive(Debug, Deserialize)]
struct Envelope {
    e: String,
    #[serde(default)]
    m: Value,
}

/// A decoded gateway event.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum Event {
    MessageCreated(MessageCreated),
    TicketClaimed(TicketClaimed),
    TicketClosed(TicketClosed),
    HeartbeatAck(HeartbeatAck),
    /// An event tag this SDK version does not know. The payload is not decoded.
    Unrecognized(String),
}

impl Event {
    /// The wire tag this event was decoded from (canonical form).
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Self::MessageCreated(_) => MESSAGE_CREATE,
            Self::TicketClaimed(_) => TICKET_CLAIMED,
            Self::TicketClosed(_) => TICKET_CLOSED,
            Self::HeartbeatAck(_) => HEARTBEAT_ACK,
            Self::Unrecognized(tag) => tag,
        }
    }
}

/// Decode one inbound frame into an [`Event`].
///
/// A malformed outer envelope or a malformed payload for a known tag is a
/// [`Kind::Decode`] error; the caller drops the frame and keeps reading.
pub fn decode(bytes: &[u8]) -> crate::Result<Event> {
    let envelope: Envelope =
        serde_json::from_slice(bytes).map_err(|e| Error::with_source(Kind::Decode, e))?;

    match envelope.e.as_str() {
        MESSAGE_CREATE => Ok(Event::MessageCreated(payload(envelope.m)?)),
        TICKET_CLAIMED | TICKET_CLAIMED_LEGACY => Ok(Event::TicketClaimed(payload(envelope.m)?)),
        TICKET_CLOSED | TICKET_CLOSED_LEGACY => Ok(Event::TicketClosed(payload(envelope.m)?)),
        HEARTBEAT_ACK => Ok(Event::HeartbeatAck(payload(envelope.m)?)),
        _ => {
            tracing::warn!(tag = %envelope.e, "unrecognized gateway event, update this crate");
            Ok(Event::Unrecognized(envelope.e))
        }
    }
}

fn payload<T: serde::de::DeserializeOwned>(m: Value) -> crate::Result<T> {
    serde_json::from_value(m).map_err(|e| Error::with_source(Kind::Decode, e))
}

/// A new message arrived on a ticket.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageCreated {
    /// External id of the ticket the message belongs to
    pub id: String,
    pub message: TicketMessage,
}

/// The message body carried inside [`MessageCreated`].
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketMessage {
    #[serde(default)]
    pub id: String,
    pub from: Sender,
    pub timestamp: Timestamp,
    pub content: String,
}

/// Who sent a message.
///
/// The wire format carries no discriminator: a non-empty `role` field selects
/// [`Sender::Employer`], anything else decodes as [`Sender::Client`].
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Sender {
    Client(ClientSender),
    Employer(EmployerSender),
}

impl Sender {
    #[must_use]
    pub const fn is_employer(&self) -> bool {
        matches!(self, Self::Employer(_))
    }
}

impl<'de> Deserialize<'de> for Sender {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;

        // Peek only at a role-like field; a failed peek means "not employer",
        // so the surfaced error can come only from the committed full decode.
        let is_employer = value
            .get("role")
            .and_then(Value::as_str)
            .is_some_and(|role| !role.is_empty());

        if is_employer {
            serde_json::from_value(value)
                .map(Sender::Employer)
                .map_err(D::Error::custom)
        } else {
            serde_json::from_value(value)
                .map(Sender::Client)
                .map_err(D::Error::custom)
        }
    }
}

/// An end user writing through one of the connected platforms.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSender {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// A support agent answering from the iocket dashboard.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerSender {
    #[serde(default)]
    pub name: String,
    pub role: String,
}

/// An agent claimed a ticket.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketClaimed {
    pub id: String,
    pub agent_name: String,
    #[serde(default)]
    pub ticket: Option<Ticket>,
    #[serde(default)]
    pub client: Option<TicketClient>,
}

/// A ticket was closed.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketClosed {
    pub external_id: String,
    pub client_external_id: String,
}

/// Server acknowledgement of an application-level heartbeat.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartbeatAck {
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
}
