//! Shared types used across the application.

use std::fmt;

/// A chat platform on one side of the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Discord,
    Fluxer,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Discord => f.write_str("Discord"),
            Platform::Fluxer => f.write_str("Fluxer"),
        }
    }
}

/// Direction of a single relay attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelayDirection {
    /// Discord message relayed into Fluxer.
    ToFluxer,
    /// Fluxer message relayed into Discord.
    ToDiscord,
}

impl RelayDirection {
    /// Direction of a relay for a message posted on `platform`.
    pub fn from_origin(platform: Platform) -> Self {
        match platform {
            Platform::Discord => RelayDirection::ToFluxer,
            Platform::Fluxer => RelayDirection::ToDiscord,
        }
    }

    /// Platform the inbound message came from.
    pub fn origin(&self) -> Platform {
        match self {
            RelayDirection::ToFluxer => Platform::Discord,
            RelayDirection::ToDiscord => Platform::Fluxer,
        }
    }

    /// Platform the payload is delivered to.
    pub fn destination(&self) -> Platform {
        match self {
            RelayDirection::ToFluxer => Platform::Fluxer,
            RelayDirection::ToDiscord => Platform::Discord,
        }
    }

    /// Whether the destination renders the structured embed `timestamp` field.
    ///
    /// Discord does, Fluxer does not.
    pub fn renders_embed_timestamp(&self) -> bool {
        self.destination() == Platform::Discord
    }
}

/// Author of an inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Author {
    pub id: String,
    pub username: String,
    /// Stored avatar hash. Animated hashes carry the `a_` prefix.
    pub avatar: Option<String>,
    /// Legacy discriminator (Discord only). `None` or `0` for migrated usernames.
    pub discriminator: Option<u16>,
    pub bot: bool,
}

/// File attached to an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub url: String,
}

/// Creation time as reported by the origin platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreatedAt {
    /// Milliseconds since the Unix epoch.
    Millis(i64),
    /// ISO-8601 / RFC 3339 string.
    Iso(String),
}
