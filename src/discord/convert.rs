//! Conversion between serenity models and bridge messages.

use serenity::builder::{CreateEmbed, CreateEmbedAuthor, CreateEmbedFooter, CreateMessage};
use serenity::model::channel::{Message, MessageFlags};
use serenity::model::id::ChannelId;
use serenity::model::Timestamp;
use tracing::debug;

use crate::common::error::SendError;
use crate::common::messages::{Embed, InboundMessage, OutboundPayload};
use crate::common::types::{Attachment, Author, CreatedAt, Platform};

/// Turn a gateway message into an [`InboundMessage`].
pub fn to_inbound(message: &Message) -> InboundMessage {
    let author = &message.author;

    let embeds = message
        .embeds
        .iter()
        .filter_map(|embed| match serde_json::to_value(embed) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("Skipping unserializable Discord embed: {}", e);
                None
            }
        })
        .collect();

    InboundMessage {
        platform: Platform::Discord,
        channel_id: message.channel_id.to_string(),
        author: Author {
            id: author.id.to_string(),
            username: author.name.clone(),
            avatar: author.avatar.as_ref().map(|hash| hash.to_string()),
            discriminator: author.discriminator.map(|d| d.get()),
            bot: author.bot,
        },
        is_crosspost: message
            .flags
            .is_some_and(|flags| flags.contains(MessageFlags::IS_CROSSPOST)),
        content: message.content.clone(),
        attachments: message
            .attachments
            .iter()
            .map(|a| Attachment {
                name: a.filename.clone(),
                url: a.url.clone(),
            })
            .collect(),
        embeds,
        created_at: Some(CreatedAt::Millis(message.timestamp.unix_timestamp() * 1000)),
    }
}

/// Parse a configured channel id into a serenity id.
pub fn parse_channel_id(channel_id: &str) -> Result<ChannelId, SendError> {
    match channel_id.parse::<u64>() {
        Ok(id) if id != 0 => Ok(ChannelId::new(id)),
        _ => Err(SendError::InvalidChannel(channel_id.to_string())),
    }
}

/// Build the serenity request for an outbound payload.
pub fn to_create_message(payload: &OutboundPayload) -> CreateMessage {
    let mut builder = CreateMessage::new();
    if !payload.content.is_empty() {
        builder = builder.content(&payload.content);
    }
    if let Some(embeds) = &payload.embeds {
        builder = builder.embeds(embeds.iter().map(to_create_embed).collect());
    }
    builder
}

fn to_create_embed(embed: &Embed) -> CreateEmbed {
    let mut builder = CreateEmbed::new();

    if let Some(title) = &embed.title {
        builder = builder.title(title);
    }
    if let Some(description) = &embed.description {
        builder = builder.description(description);
    }
    if let Some(url) = &embed.url {
        builder = builder.url(url);
    }
    if let Some(color) = embed.color {
        builder = builder.colour(color);
    }
    if let Some(fields) = &embed.fields {
        builder = builder.fields(
            fields
                .iter()
                .map(|field| (field.name.clone(), field.value.clone(), field.inline)),
        );
    }
    if let Some(footer) = &embed.footer {
        let mut create_footer = CreateEmbedFooter::new(&footer.text);
        if let Some(icon_url) = &footer.icon_url {
            create_footer = create_footer.icon_url(icon_url);
        }
        builder = builder.footer(create_footer);
    }
    if let Some(image) = &embed.image {
        builder = builder.image(&image.url);
    }
    if let Some(thumbnail) = &embed.thumbnail {
        builder = builder.thumbnail(&thumbnail.url);
    }
    if let Some(author) = &embed.author {
        let mut create_author = CreateEmbedAuthor::new(&author.name);
        if let Some(url) = &author.url {
            create_author = create_author.url(url);
        }
        if let Some(icon_url) = &author.icon_url {
            create_author = create_author.icon_url(icon_url);
        }
        builder = builder.author(create_author);
    }
    if let Some(timestamp) = &embed.timestamp {
        match Timestamp::parse(timestamp) {
            Ok(timestamp) => builder = builder.timestamp(timestamp),
            Err(e) => debug!("Dropping unparseable embed timestamp '{}': {}", timestamp, e),
        }
    }

    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::messages::{EmbedAuthor, EmbedField, EmbedMedia};
    use serde_json::json;

    fn gateway_message(extra: serde_json::Value) -> Message {
        let mut value = json!({
            "id": "1100000000000000001",
            "channel_id": "222",
            "author": {
                "id": "80351110224678912",
                "username": "alice",
                "discriminator": "0",
                "avatar": "a_1269e74af4df7417b13759eae50c83dc",
                "bot": false
            },
            "content": "hello there",
            "timestamp": "2023-11-14T22:13:20.000Z",
            "edited_timestamp": null,
            "tts": false,
            "mention_everyone": false,
            "mentions": [],
            "mention_roles": [],
            "attachments": [],
            "embeds": [],
            "pinned": false,
            "type": 0
        });
        if let (Some(base), Some(extra)) = (value.as_object_mut(), extra.as_object()) {
            for (key, v) in extra {
                base.insert(key.clone(), v.clone());
            }
        }
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_to_inbound_basic_fields() {
        let inbound = to_inbound(&gateway_message(json!({})));

        assert_eq!(inbound.platform, Platform::Discord);
        assert_eq!(inbound.channel_id, "222");
        assert_eq!(inbound.author.id, "80351110224678912");
        assert_eq!(inbound.author.username, "alice");
        assert_eq!(
            inbound.author.avatar.as_deref(),
            Some("a_1269e74af4df7417b13759eae50c83dc")
        );
        assert_eq!(inbound.author.discriminator, None);
        assert!(!inbound.author.bot);
        assert!(!inbound.is_crosspost);
        assert_eq!(inbound.content, "hello there");
        assert_eq!(
            inbound.created_at,
            Some(CreatedAt::Millis(1_700_000_000_000))
        );
    }

    #[test]
    fn test_to_inbound_crosspost_and_attachments() {
        let inbound = to_inbound(&gateway_message(json!({
            "flags": 2,
            "attachments": [{
                "id": "1",
                "filename": "a.png",
                "size": 10,
                "url": "https://cdn.discordapp.com/attachments/a.png",
                "proxy_url": "https://media.discordapp.net/attachments/a.png"
            }]
        })));

        assert!(inbound.is_crosspost);
        assert_eq!(
            inbound.attachments,
            vec![Attachment {
                name: "a.png".to_string(),
                url: "https://cdn.discordapp.com/attachments/a.png".to_string(),
            }]
        );
    }

    #[test]
    fn test_parse_channel_id() {
        assert_eq!(parse_channel_id("123").unwrap(), ChannelId::new(123));
        assert!(matches!(
            parse_channel_id("0"),
            Err(SendError::InvalidChannel(_))
        ));
        assert!(matches!(
            parse_channel_id("general"),
            Err(SendError::InvalidChannel(_))
        ));
    }

    fn avatar_embed(timestamp: &str) -> Embed {
        Embed {
            description: Some("hey".to_string()),
            color: Some(5_814_783),
            fields: Some(vec![EmbedField {
                name: "Score".to_string(),
                value: "3".to_string(),
                inline: true,
            }]),
            timestamp: Some(timestamp.to_string()),
            image: Some(EmbedMedia {
                url: "https://media/cat.png".to_string(),
            }),
            author: Some(EmbedAuthor {
                name: "bob".to_string(),
                url: None,
                icon_url: Some("https://fluxerstatic.com/avatars/2.png".to_string()),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_message_carries_embed_fields() {
        let payload = OutboundPayload {
            content: String::new(),
            embeds: Some(vec![avatar_embed("2023-11-14T22:13:20.000Z")]),
        };
        let value = serde_json::to_value(to_create_message(&payload)).unwrap();

        assert!(value.get("content").map_or(true, |v| v.is_null()));
        let embed = &value["embeds"][0];
        assert_eq!(embed["description"], "hey");
        assert_eq!(embed["color"], 5_814_783);
        assert_eq!(embed["fields"][0]["name"], "Score");
        assert_eq!(embed["fields"][0]["inline"], true);
        assert_eq!(embed["image"]["url"], "https://media/cat.png");
        assert_eq!(embed["author"]["name"], "bob");
        assert_eq!(
            embed["author"]["icon_url"],
            "https://fluxerstatic.com/avatars/2.png"
        );
        let timestamp = Timestamp::parse(embed["timestamp"].as_str().unwrap()).unwrap();
        assert_eq!(timestamp.unix_timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_create_message_drops_bad_timestamp() {
        let payload = OutboundPayload {
            content: "**bob**: hey".to_string(),
            embeds: Some(vec![avatar_embed("yesterday")]),
        };
        let value = serde_json::to_value(to_create_message(&payload)).unwrap();

        assert_eq!(value["content"], "**bob**: hey");
        let embed = &value["embeds"][0];
        assert!(embed.get("timestamp").map_or(true, |v| v.is_null()));
        assert_eq!(embed["author"]["name"], "bob");
    }
}
