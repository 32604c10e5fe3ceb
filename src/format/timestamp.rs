//! Platform timestamp markers.
//!
//! Both platforms render `<t:SECONDS:STYLE>` in message text using the
//! reader's locale. `R` is relative ("3 minutes ago"), `F` the full date and
//! time, `f` the short date and time.

use chrono::{DateTime, SecondsFormat};

use crate::common::types::CreatedAt;
use crate::config::types::TimestampFormat;

/// Normalize a creation time to whole seconds since the epoch.
pub fn epoch_seconds(created_at: &CreatedAt) -> Option<i64> {
    match created_at {
        CreatedAt::Millis(ms) => Some(ms.div_euclid(1000)),
        CreatedAt::Iso(iso) => DateTime::parse_from_rfc3339(iso)
            .ok()
            .map(|dt| dt.timestamp()),
    }
}

/// Suffix appended to relayed content for the configured format.
///
/// Empty when the format is `None` or the time can't be resolved.
pub fn timestamp_suffix(created_at: Option<&CreatedAt>, format: TimestampFormat) -> String {
    let style = match format {
        TimestampFormat::None => return String::new(),
        TimestampFormat::Relative => 'R',
        TimestampFormat::Absolute => 'F',
    };

    match created_at.and_then(epoch_seconds) {
        Some(secs) => format!("\n*{}*", marker(secs, style)),
        None => String::new(),
    }
}

/// `<t:SECONDS:STYLE>` marker.
pub fn marker(secs: i64, style: char) -> String {
    format!("<t:{secs}:{style}>")
}

/// ISO-8601 UTC string with millisecond precision, e.g. `2024-01-01T00:00:00.000Z`.
pub fn iso_string(secs: i64) -> Option<String> {
    DateTime::from_timestamp(secs, 0).map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}
