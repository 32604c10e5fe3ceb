//! Embed projection.
//!
//! Raw embeds from either platform are cut down to the fields both platforms
//! accept. Anything else (video, provider, proxy URLs, type) is dropped.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::common::messages::Embed;

/// Convert raw embeds, preserving order.
pub fn convert_embeds(source: &[Value]) -> Vec<Embed> {
    source.iter().map(convert_embed).collect()
}

/// Project one raw embed onto the whitelist.
pub fn convert_embed(source: &Value) -> Embed {
    Embed {
        title: field(source, "title"),
        description: field(source, "description"),
        url: field(source, "url"),
        color: field(source, "color"),
        fields: field(source, "fields"),
        footer: field(source, "footer"),
        timestamp: field(source, "timestamp"),
        image: field(source, "image"),
        thumbnail: field(source, "thumbnail"),
        author: field(source, "author"),
    }
}

/// Read `key` from `source`. Absent, null or malformed values are omitted.
fn field<T: DeserializeOwned>(source: &Value, key: &str) -> Option<T> {
    let value = source.get(key).filter(|v| !v.is_null())?;
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            debug!(key, error = %e, "Dropping malformed embed field");
            None
        }
    }
}
