//! Message transformation for relaying.
//!
//! This module contains:
//! - Avatar URL resolution per platform
//! - Timestamp markers
//! - Attachment listings
//! - Embed projection
//! - Payload composition

pub mod attachment;
pub mod avatar;
pub mod embed;
pub mod payload;
pub mod timestamp;

pub use attachment::append_attachments;
pub use avatar::avatar_url;
pub use embed::convert_embeds;
pub use payload::{build_payload, PayloadInput};

/// Content preview for log lines: the first `max_len` characters.
pub fn preview(content: &str, max_len: usize) -> &str {
    match content.char_indices().nth(max_len) {
        Some((end, _)) => &content[..end],
        None => content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_short() {
        assert_eq!(preview("hello", 50), "hello");
        assert_eq!(preview("", 50), "");
    }

    #[test]
    fn test_preview_truncates() {
        assert_eq!(preview("abcdefghij", 4), "abcd");
    }

    #[test]
    fn test_preview_keeps_newlines() {
        assert_eq!(preview("line one\nline two", 50), "line one\nline two");
        assert_eq!(preview("ab\ncd", 4), "ab\nc");
    }

    #[test]
    fn test_preview_counts_characters() {
        assert_eq!(preview("café au lait", 4), "café");

        let cyrillic = "я".repeat(60);
        assert_eq!(preview(&cyrillic, 50).chars().count(), 50);
        assert_eq!(preview(&cyrillic, 50).len(), 100);
    }
}
