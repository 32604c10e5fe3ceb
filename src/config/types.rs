//! Configuration type definitions.
//!
//! `Raw*` types mirror the JSON file as written by operators: every field is
//! optional and loosely typed. Validation turns them into the fully populated
//! [`Config`] that the rest of the bridge reads.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

/// Root of `config.json` as deserialized.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConfig {
    pub mappings: Option<Vec<RawMapping>>,
    pub default_formatting: Option<RawFormatting>,
}

/// One entry of the `mappings` array.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMapping {
    pub discord_id: Option<Value>,
    pub fluxer_id: Option<Value>,
    pub direction: Option<Value>,
    pub label: Option<Value>,
    pub allow_crossposts: Option<Value>,
    pub formatting: Option<RawFormatting>,
}

/// Formatting block; absent fields fall back to the default profile.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFormatting {
    pub include_username: Option<Value>,
    pub include_avatar: Option<Value>,
    pub timestamp_format: Option<Value>,
}

/// Validated configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub mappings: Vec<Mapping>,
    pub default_formatting: FormattingProfile,
}

/// Which way messages flow for a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Discord to Fluxer only (`"d2f"`).
    #[default]
    DiscordToFluxer,
    /// Fluxer to Discord only (`"f2d"`).
    FluxerToDiscord,
    /// Bidirectional (`"both"`).
    Both,
}

impl Direction {
    /// Parse a direction from its config string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "d2f" => Some(Direction::DiscordToFluxer),
            "f2d" => Some(Direction::FluxerToDiscord),
            "both" => Some(Direction::Both),
            _ => None,
        }
    }

    /// Check if this direction allows Discord -> Fluxer messages.
    pub fn allows_to_fluxer(&self) -> bool {
        matches!(self, Direction::DiscordToFluxer | Direction::Both)
    }

    /// Check if this direction allows Fluxer -> Discord messages.
    pub fn allows_to_discord(&self) -> bool {
        matches!(self, Direction::FluxerToDiscord | Direction::Both)
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Direction::DiscordToFluxer => "→",
            Direction::FluxerToDiscord => "←",
            Direction::Both => "↔",
        }
    }
}

/// How the relayed time is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampFormat {
    #[default]
    None,
    /// `<t:…:R>`, e.g. "3 minutes ago".
    Relative,
    /// `<t:…:F>`, full date and time.
    Absolute,
}

impl TimestampFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(TimestampFormat::None),
            "relative" => Some(TimestampFormat::Relative),
            "absolute" => Some(TimestampFormat::Absolute),
            _ => None,
        }
    }
}

impl fmt::Display for TimestampFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimestampFormat::None => f.write_str("none"),
            TimestampFormat::Relative => f.write_str("relative"),
            TimestampFormat::Absolute => f.write_str("absolute"),
        }
    }
}

/// Presentation choices applied per relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormattingProfile {
    pub include_username: bool,
    pub include_avatar: bool,
    pub timestamp_format: TimestampFormat,
}

/// One channel-pair relay rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Mapping {
    pub discord_id: String,
    pub fluxer_id: String,
    pub direction: Direction,
    pub label: Option<String>,
    pub allow_crossposts: bool,
    pub formatting: FormattingProfile,
}

impl fmt::Display for Mapping {
    /// One-line summary used in the startup bridge listing.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Discord {} {} Fluxer {}",
            self.discord_id,
            self.direction.arrow(),
            self.fluxer_id
        )?;
        if let Some(label) = &self.label {
            write!(f, " [{label}]")?;
        }
        write!(
            f,
            " (username={}, avatar={}, ts={}",
            self.formatting.include_username,
            self.formatting.include_avatar,
            self.formatting.timestamp_format
        )?;
        if self.allow_crossposts {
            f.write_str(", crossposts=✓")?;
        }
        f.write_str(")")
    }
}
