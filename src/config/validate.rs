//! Configuration validation.
//!
//! Turns the raw JSON shape into a fully populated [`Config`]. Missing channel
//! ids are fatal; bad `direction` or `timestampFormat` values are logged and
//! coerced to their defaults. Flags given as non-booleans are read by
//! truthiness, and a non-string `label` is kept as its JSON text.

use serde_json::Value;
use tracing::warn;

use crate::common::error::ConfigError;
use crate::config::types::{
    Config, Direction, FormattingProfile, Mapping, RawConfig, RawFormatting, RawMapping,
    TimestampFormat,
};

/// Validate a raw configuration and resolve every default.
pub fn resolve_config(raw: RawConfig) -> Result<Config, ConfigError> {
    let raw_mappings = match raw.mappings {
        Some(mappings) if !mappings.is_empty() => mappings,
        _ => return Err(ConfigError::NoMappings),
    };

    let default_formatting = resolve_formatting(
        raw.default_formatting.as_ref(),
        &FormattingProfile::default(),
        "defaultFormatting",
    );

    let mappings = raw_mappings
        .iter()
        .enumerate()
        .map(|(i, mapping)| resolve_mapping(i, mapping, &default_formatting))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Config {
        mappings,
        default_formatting,
    })
}

/// Human-readable name of a mapping entry for log and error messages.
fn mapping_name(index: usize, label: Option<&str>) -> String {
    match label {
        Some(label) => format!("mappings[{index}] (\"{label}\")"),
        None => format!("mappings[{index}]"),
    }
}

fn resolve_mapping(
    index: usize,
    raw: &RawMapping,
    default_formatting: &FormattingProfile,
) -> Result<Mapping, ConfigError> {
    let label = mapping_label(raw.label.as_ref(), index);
    let name = mapping_name(index, label.as_deref());

    let discord_id = channel_id(raw.discord_id.as_ref()).ok_or_else(|| {
        ConfigError::InvalidMapping {
            mapping: name.clone(),
            field: "discordId",
        }
    })?;
    let fluxer_id = channel_id(raw.fluxer_id.as_ref()).ok_or_else(|| {
        ConfigError::InvalidMapping {
            mapping: name.clone(),
            field: "fluxerId",
        }
    })?;

    let direction = match &raw.direction {
        None | Some(Value::Null) => Direction::default(),
        Some(value) => value.as_str().and_then(Direction::parse).unwrap_or_else(|| {
            warn!("{name}: invalid direction {value}, falling back to \"d2f\"");
            Direction::default()
        }),
    };

    Ok(Mapping {
        discord_id,
        fluxer_id,
        direction,
        allow_crossposts: flag(raw.allow_crossposts.as_ref(), false, &name, "allowCrossposts"),
        label,
        formatting: resolve_formatting(raw.formatting.as_ref(), default_formatting, &name),
    })
}

fn mapping_label(value: Option<&Value>, index: usize) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(label) => Some(label.clone()),
        other => {
            warn!("mappings[{index}]: label {other} is not a string, using it as text");
            Some(other.to_string())
        }
    }
}

/// Read a boolean option, accepting any JSON value by truthiness.
fn flag(value: Option<&Value>, fallback: bool, name: &str, field: &str) -> bool {
    let value = match value {
        None | Some(Value::Null) => return fallback,
        Some(Value::Bool(b)) => return *b,
        Some(value) => value,
    };
    let truthy = match value {
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        _ => true,
    };
    warn!("{name}: {field} {value} is not a boolean, treating it as {truthy}");
    truthy
}

/// A channel id must be a non-empty string. Surrounding whitespace is trimmed.
fn channel_id(value: Option<&Value>) -> Option<String> {
    let id = value?.as_str()?.trim();
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

/// Merge a formatting block over `fallback`, field by field.
fn resolve_formatting(
    raw: Option<&RawFormatting>,
    fallback: &FormattingProfile,
    name: &str,
) -> FormattingProfile {
    let Some(raw) = raw else {
        return *fallback;
    };

    let timestamp_format = match &raw.timestamp_format {
        None | Some(Value::Null) => fallback.timestamp_format,
        Some(value) => value
            .as_str()
            .and_then(TimestampFormat::parse)
            .unwrap_or_else(|| {
                warn!("{name}: invalid timestampFormat {value}, falling back to \"none\"");
                TimestampFormat::None
            }),
    };

    FormattingProfile {
        include_username: flag(
            raw.include_username.as_ref(),
            fallback.include_username,
            name,
            "includeUsername",
        ),
        include_avatar: flag(
            raw.include_avatar.as_ref(),
            fallback.include_avatar,
            name,
            "includeAvatar",
        ),
        timestamp_format,
    }
}
