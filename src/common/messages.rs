//! Canonical message types for bridge communication.
//!
//! Both platform adapters produce [`InboundMessage`] records and accept
//! [`OutboundPayload`] values, so the relay core never sees SDK types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::types::{Attachment, Author, CreatedAt, Platform};

/// A message received from one of the platforms.
///
/// Created by the adapter per incoming event and discarded after being
/// relayed or dropped.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Platform the message was posted on.
    pub platform: Platform,
    pub channel_id: String,
    pub author: Author,
    /// Discord re-broadcast of a followed announcement channel.
    pub is_crosspost: bool,
    pub content: String,
    pub attachments: Vec<Attachment>,
    /// Raw embed objects as the origin platform's API serializes them.
    pub embeds: Vec<Value>,
    pub created_at: Option<CreatedAt>,
}

impl InboundMessage {
    /// True if there is nothing worth relaying.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() && self.embeds.is_empty() && self.attachments.is_empty()
    }
}

/// Final message handed to a destination platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundPayload {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embeds: Option<Vec<Embed>>,
}

/// Embed restricted to the fields both platforms accept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<EmbedField>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<EmbedMedia>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedMedia>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<EmbedAuthor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedFooter {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

/// Image or thumbnail reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedMedia {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedAuthor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_without_embeds_omits_key() {
        let payload = OutboundPayload {
            content: "**alice**: hi".to_string(),
            embeds: None,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value, json!({ "content": "**alice**: hi" }));
    }

    #[test]
    fn test_embed_omits_absent_fields() {
        let embed = Embed {
            description: Some("hi".to_string()),
            author: Some(EmbedAuthor {
                name: "alice".to_string(),
                url: None,
                icon_url: Some("https://cdn/a.png".to_string()),
            }),
            ..Default::default()
        };
        let value = serde_json::to_value(&embed).unwrap();
        assert_eq!(
            value,
            json!({
                "description": "hi",
                "author": { "name": "alice", "icon_url": "https://cdn/a.png" }
            })
        );
    }

    #[test]
    fn test_is_empty() {
        let mut msg = InboundMessage {
            platform: Platform::Fluxer,
            channel_id: "1".to_string(),
            author: Author::default(),
            is_crosspost: false,
            content: String::new(),
            attachments: Vec::new(),
            embeds: Vec::new(),
            created_at: None,
        };
        assert!(msg.is_empty());

        msg.embeds.push(json!({ "title": "x" }));
        assert!(!msg.is_empty());
    }
}
