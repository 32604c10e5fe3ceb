//! Attachment listing appended to relayed text.

use crate::common::types::Attachment;

const ATTACHMENTS_LABEL: &str = "📎 Attachments:";

/// Append a markdown link per attachment, in original order.
pub fn append_attachments(base: &str, attachments: &[Attachment]) -> String {
    if attachments.is_empty() {
        return base.to_string();
    }

    let links = attachments
        .iter()
        .map(|a| format!("[{}]({})", a.name, a.url))
        .collect::<Vec<_>>()
        .join("\n");

    format!("{base}\n\n{ATTACHMENTS_LABEL}\n{links}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attachment(name: &str, url: &str) -> Attachment {
        Attachment {
            name: name.to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn test_no_attachments_unchanged() {
        assert_eq!(append_attachments("hello", &[]), "hello");
        assert_eq!(append_attachments("", &[]), "");
    }

    #[test]
    fn test_attachments_in_order() {
        let rendered = append_attachments(
            "",
            &[attachment("a.png", "u1"), attachment("b.png", "u2")],
        );
        assert_eq!(rendered, "\n\n📎 Attachments:\n[a.png](u1)\n[b.png](u2)");
    }

    #[test]
    fn test_attachments_after_text() {
        let rendered = append_attachments("look", &[attachment("cat.jpg", "https://cdn/cat.jpg")]);
        assert_eq!(
            rendered,
            "look\n\n📎 Attachments:\n[cat.jpg](https://cdn/cat.jpg)"
        );
    }
}
