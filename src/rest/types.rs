//! Request bodies for the REST endpoints.

use bon::Builder;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request to open a ticket on behalf of an end user.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
pub struct CreateTicket {
    /// Category the ticket is filed under
    pub category_id: String,
    /// Human-readable ticket title
    #[builder(into)]
    pub name: String,
    pub platform: CreateTicketPlatform,
}

/// Identifies the end user and origin platform of a new ticket.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
pub struct CreateTicketPlatform {
    /// The user's id on the origin platform
    #[builder(into)]
    pub external_id: String,
    #[builder(into)]
    pub username: String,
    /// Opaque platform-specific payload, forwarded untouched
    #[builder(default)]
    #[serde(default)]
    pub extra_data: Value,
    /// The channel the ticket belongs to
    #[builder(into)]
    pub channel_external_id: String,
}

/// A message sent by the bot into an existing ticket.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
pub struct OutgoingMessage {
    /// External id of the ticket's chat
    #[builder(into)]
    pub chat_external_id: String,
    /// External id of the end user the message is addressed to
    #[builder(into)]
    pub client_external_id: String,
    /// Caller-chosen id for deduplication on the server side
    #[builder(into)]
    pub message_external_id: String,
    #[builder(into)]
    pub content: String,
}
