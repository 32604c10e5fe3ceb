//! Outbound payload composition.
//!
//! Three modes, picked per mapping:
//! - avatar: content moves into an embed authored by the sender, existing
//!   embeds follow it
//! - username: plain text with a `**username**: ` prefix
//! - plain: the content alone

use chrono::Utc;

use crate::common::messages::{Embed, EmbedAuthor, EmbedMedia, OutboundPayload};
use crate::common::types::{CreatedAt, RelayDirection};
use crate::config::types::FormattingProfile;
use crate::format::timestamp::{epoch_seconds, iso_string, marker, timestamp_suffix};

/// Transparent wide image that keeps avatar embeds from collapsing to the
/// width of short messages.
pub const EMBED_FORCE_WIDTH_IMAGE: &str = "https://groupsync.network/assets/embedforcewidth.png";

/// Everything the builder needs from one relay attempt.
#[derive(Debug, Clone)]
pub struct PayloadInput<'a> {
    pub username: &'a str,
    pub avatar_url: &'a str,
    /// Message text with the attachment listing already appended.
    pub content: &'a str,
    /// Embeds from the original message, already converted.
    pub existing_embeds: Vec<Embed>,
    pub formatting: &'a FormattingProfile,
    pub created_at: Option<&'a CreatedAt>,
    pub direction: RelayDirection,
}

/// Build the payload for one relay attempt.
pub fn build_payload(input: PayloadInput<'_>) -> OutboundPayload {
    let suffix = timestamp_suffix(input.created_at, input.formatting.timestamp_format);
    let full = format!("{}{}", input.content, suffix);

    if input.formatting.include_avatar {
        let avatar_embed = avatar_embed(&input, &full);
        let mut embeds = Vec::with_capacity(1 + input.existing_embeds.len());
        embeds.push(avatar_embed);
        embeds.extend(input.existing_embeds);

        return OutboundPayload {
            content: String::new(),
            embeds: Some(embeds),
        };
    }

    let content = if input.formatting.include_username {
        format!("**{}**: {}", input.username, full)
    } else {
        full
    };

    let embeds = if input.existing_embeds.is_empty() {
        None
    } else {
        Some(input.existing_embeds)
    };

    OutboundPayload { content, embeds }
}

/// Embed carrying the message as if posted by the original author.
///
/// Discord shows the structured `timestamp` field in the embed footer; Fluxer
/// ignores it, so toward Fluxer the time goes in as a small-text marker on the
/// last description line instead.
fn avatar_embed(input: &PayloadInput<'_>, full: &str) -> Embed {
    let secs = input
        .created_at
        .and_then(epoch_seconds)
        .unwrap_or_else(|| Utc::now().timestamp());

    let (description, timestamp) = if input.direction.renders_embed_timestamp() {
        let description = if full.is_empty() {
            None
        } else {
            Some(full.to_string())
        };
        (description, iso_string(secs))
    } else {
        let inline = format!("-# {}", marker(secs, 'f'));
        let description = if full.is_empty() {
            inline
        } else {
            format!("{full}\n{inline}")
        };
        (Some(description), None)
    };

    Embed {
        description,
        timestamp,
        author: Some(EmbedAuthor {
            name: input.username.to_string(),
            url: None,
            icon_url: Some(input.avatar_url.to_string()),
        }),
        image: Some(EmbedMedia {
            url: EMBED_FORCE_WIDTH_IMAGE.to_string(),
        }),
        ..Default::default()
    }
}
