//! Author avatar URLs.
//!
//! Both CDNs mark animated avatars with an `a_` hash prefix. URLs are built
//! purely from the author record so the same author always maps to the same
//! string.

use crate::common::types::{Author, Platform};

const DISCORD_CDN: &str = "https://cdn.discordapp.com";
const FLUXER_CDN: &str = "https://fluxerusercontent.com";
const FLUXER_STATIC: &str = "https://fluxerstatic.com";

/// Render size requested from either CDN.
pub const AVATAR_SIZE: u32 = 256;

/// Number of built-in default avatars on both platforms.
const DEFAULT_AVATAR_COUNT: u64 = 6;

/// Resolve the avatar URL for `author` on `platform`.
pub fn avatar_url(platform: Platform, author: &Author) -> String {
    match platform {
        Platform::Discord => discord_avatar_url(author),
        Platform::Fluxer => fluxer_avatar_url(author),
    }
}

fn is_animated(hash: &str) -> bool {
    hash.starts_with("a_")
}

fn parse_id(id: &str) -> u64 {
    id.parse().unwrap_or(0)
}

/// Discord avatar, static PNG unless the hash is animated.
pub fn discord_avatar_url(author: &Author) -> String {
    match author.avatar.as_deref() {
        Some(hash) => {
            let ext = if is_animated(hash) { "gif" } else { "png" };
            format!(
                "{DISCORD_CDN}/avatars/{}/{hash}.{ext}?size={AVATAR_SIZE}",
                author.id
            )
        }
        None => format!(
            "{DISCORD_CDN}/embed/avatars/{}.png",
            discord_default_avatar_index(author)
        ),
    }
}

/// Index of Discord's default avatar for users without one.
///
/// Migrated usernames (no discriminator) use the snowflake, legacy `#1234`
/// users use the discriminator.
pub fn discord_default_avatar_index(author: &Author) -> u64 {
    match author.discriminator {
        Some(discriminator) if discriminator != 0 => u64::from(discriminator) % 5,
        _ => (parse_id(&author.id) >> 22) % DEFAULT_AVATAR_COUNT,
    }
}

/// Fluxer avatar, WebP unless the hash is animated.
pub fn fluxer_avatar_url(author: &Author) -> String {
    match author.avatar.as_deref() {
        Some(hash) => {
            let ext = if is_animated(hash) { "gif" } else { "webp" };
            format!(
                "{FLUXER_CDN}/avatars/{}/{hash}.{ext}?size={AVATAR_SIZE}",
                author.id
            )
        }
        None => format!(
            "{FLUXER_STATIC}/avatars/{}.png",
            parse_id(&author.id) % DEFAULT_AVATAR_COUNT
        ),
    }
}
