//! Fluxer wire types.
//!
//! Fluxer speaks the Discord v10 gateway and REST dialect under its own API
//! version, so these mirror the Discord shapes the bridge needs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::messages::InboundMessage;
use crate::common::types::{Attachment, Author, CreatedAt, Platform};

/// Gateway opcodes.
pub mod opcode {
    pub const DISPATCH: u8 = 0;
    pub const HEARTBEAT: u8 = 1;
    pub const IDENTIFY: u8 = 2;
    pub const RECONNECT: u8 = 7;
    pub const INVALID_SESSION: u8 = 9;
    pub const HELLO: u8 = 10;
    pub const HEARTBEAT_ACK: u8 = 11;
}

/// Gateway frame, both directions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayPayload {
    pub op: u8,
    #[serde(default)]
    pub d: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
}

impl GatewayPayload {
    pub fn new(op: u8, d: Value) -> Self {
        Self {
            op,
            d,
            s: None,
            t: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Hello {
    /// Milliseconds between heartbeats.
    pub heartbeat_interval: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Identify {
    pub token: String,
    pub intents: u64,
    pub properties: IdentifyProperties,
}

#[derive(Debug, Clone, Serialize)]
pub struct IdentifyProperties {
    pub os: String,
    pub browser: String,
    pub device: String,
}

impl IdentifyProperties {
    pub fn current() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            browser: env!("CARGO_PKG_NAME").to_string(),
            device: env!("CARGO_PKG_NAME").to_string(),
        }
    }
}

/// Response of `GET /gateway/bot`.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayBot {
    pub url: String,
}

/// Error body returned by the REST API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    /// Seconds, on 429 responses.
    #[serde(default)]
    pub retry_after: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReadyEvent {
    pub user: FluxerUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FluxerUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub avatar: Option<String>,
    /// `null` and absent both mean not a bot.
    #[serde(default)]
    pub bot: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FluxerAttachment {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub url: String,
}

/// `MESSAGE_CREATE` dispatch data.
#[derive(Debug, Clone, Deserialize)]
pub struct FluxerMessage {
    pub channel_id: String,
    pub author: FluxerUser,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub attachments: Option<Vec<FluxerAttachment>>,
    #[serde(default)]
    pub embeds: Option<Vec<Value>>,
    /// ISO-8601 creation time.
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl From<FluxerMessage> for InboundMessage {
    fn from(message: FluxerMessage) -> Self {
        InboundMessage {
            platform: Platform::Fluxer,
            channel_id: message.channel_id,
            author: Author {
                id: message.author.id,
                username: message.author.username,
                avatar: message.author.avatar,
                discriminator: None,
                bot: message.author.bot.unwrap_or_default(),
            },
            is_crosspost: false,
            content: message.content.unwrap_or_default(),
            attachments: message
                .attachments
                .unwrap_or_default()
                .into_iter()
                .map(|a| Attachment {
                    name: a.filename.or(a.name).unwrap_or_default(),
                    url: a.url,
                })
                .collect(),
            embeds: message.embeds.unwrap_or_default(),
            created_at: message.timestamp.map(CreatedAt::Iso),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_hello_frame() {
        let frame: GatewayPayload = serde_json::from_str(
            r#"{"op":10,"d":{"heartbeat_interval":41250},"s":null,"t":null}"#,
        )
        .unwrap();
        assert_eq!(frame.op, opcode::HELLO);
        let hello: Hello = serde_json::from_value(frame.d).unwrap();
        assert_eq!(hello.heartbeat_interval, 41250);
    }

    #[test]
    fn test_heartbeat_frame_shape() {
        let frame = GatewayPayload::new(opcode::HEARTBEAT, json!(42));
        assert_eq!(
            serde_json::to_value(&frame).unwrap(),
            json!({ "op": 1, "d": 42 })
        );
    }

    #[test]
    fn test_message_create_to_inbound() {
        let data = json!({
            "id": "5",
            "channel_id": "987",
            "author": {
                "id": "14",
                "username": "bob",
                "avatar": "abc123",
                "bot": false
            },
            "content": "hey",
            "attachments": [
                { "id": "1", "filename": "cat.png", "url": "https://media/cat.png" },
                { "id": "2", "name": "dog.png", "url": "https://media/dog.png" }
            ],
            "embeds": [{ "title": "t" }],
            "timestamp": "2023-11-14T22:13:20.000000+00:00"
        });
        let message: FluxerMessage = serde_json::from_value(data).unwrap();
        let inbound = InboundMessage::from(message);

        assert_eq!(inbound.platform, Platform::Fluxer);
        assert_eq!(inbound.channel_id, "987");
        assert_eq!(inbound.author.username, "bob");
        assert_eq!(inbound.author.avatar.as_deref(), Some("abc123"));
        assert!(!inbound.is_crosspost);
        assert_eq!(inbound.attachments[0].name, "cat.png");
        assert_eq!(inbound.attachments[1].name, "dog.png");
        assert_eq!(inbound.embeds.len(), 1);
        assert_eq!(
            inbound.created_at,
            Some(CreatedAt::Iso("2023-11-14T22:13:20.000000+00:00".to_string()))
        );
    }

    #[test]
    fn test_message_with_null_content() {
        let data = json!({
            "channel_id": "987",
            "author": { "id": "14", "username": "bot", "bot": true },
            "content": null
        });
        let inbound = InboundMessage::from(serde_json::from_value::<FluxerMessage>(data).unwrap());
        assert_eq!(inbound.content, "");
        assert!(inbound.author.bot);
        assert!(inbound.is_empty());
        assert_eq!(inbound.created_at, None);
    }

    #[test]
    fn test_null_lists_and_flags_are_empty() {
        let data = json!({
            "channel_id": "987",
            "author": { "id": "14", "username": "bob", "bot": null },
            "content": "hey",
            "attachments": null,
            "embeds": null,
            "timestamp": null
        });
        let inbound = InboundMessage::from(serde_json::from_value::<FluxerMessage>(data).unwrap());
        assert_eq!(inbound.content, "hey");
        assert!(!inbound.author.bot);
        assert!(inbound.attachments.is_empty());
        assert!(inbound.embeds.is_empty());
        assert_eq!(inbound.created_at, None);
    }
}
