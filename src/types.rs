//! Value objects shared between the gateway and REST surfaces.

use serde::{Deserialize, Serialize};

/// The authenticated connection target, received once per successful handshake.
///
/// Immutable for the lifetime of a connection; a reconnection replaces the whole
/// value. [`crate::Client::channel`] hands out a snapshot of the most recent one.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub org_id: String,
    pub name: String,
    #[serde(default)]
    pub categories: Vec<Category>,
}

/// A ticket category configured on the channel.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// Ticket state as carried inside gateway events. No independent lifecycle.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub external_id: String,
    pub category_id: String,
}

/// The end user a ticket belongs to, as carried inside gateway events.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketClient {
    pub external_id: String,
    /// Platform-specific blob, passed through untouched.
    #[serde(default)]
    pub extra_data: serde_json::Value,
    pub platform: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn channel_decodes_handshake_payload() {
        let payload = json!({
            "id": "ch_1",
            "org_id": "org_9",
            "name": "support",
            "categories": [
                { "id": "c1", "name": "Billing" },
                { "id": "c2", "name": "Outages" }
            ]
        });

        let channel: Channel = serde_json::from_value(payload).expect("decode");
        assert_eq!(channel.id, "ch_1");
        assert_eq!(channel.org_id, "org_9");
        assert_eq!(channel.name, "support");
        assert_eq!(channel.categories.len(), 2);
        assert_eq!(channel.categories[1].name, "Outages");
    }

    #[test]
    fn channel_categories_default_to_empty() {
        let payload = json!({ "id": "ch_1", "org_id": "org_9", "name": "support" });
        let channel: Channel = serde_json::from_value(payload).expect("decode");
        assert!(channel.categories.is_empty());
    }
}
