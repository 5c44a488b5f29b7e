//! Caption and link text building.

use chrono::{DateTime, NaiveDateTime};

use crate::store::ContentItem;
use crate::text::truncate_with_ellipsis;

const MESSAGE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render a producer publish time for display.
///
/// Offsets are not converted; the wall time of the original timezone is
/// shown. Unparseable values are shown as-is.
pub fn format_publish_time(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.naive_local().format(MESSAGE_TIME_FORMAT).to_string();
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.format(MESSAGE_TIME_FORMAT).to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Caption for the first file of a post: author, publish time, then the post text.
pub fn build_caption(item: &ContentItem, max_chars: usize) -> String {
    let caption = format!(
        "#{} {}\n{}\n{}",
        item.user.screen_name,
        item.user.name,
        format_publish_time(&item.publish_time),
        item.full_text
    );
    truncate_with_ellipsis(&caption, max_chars)
}

/// Text message announcing a live space or broadcast.
pub fn build_link_text(item: &ContentItem, max_chars: usize) -> String {
    let text = format!(
        "#{} #{}\n{}\n{}",
        item.user.screen_name,
        item.kind,
        format_publish_time(&item.publish_time),
        item.url
    );
    truncate_with_ellipsis(&text, max_chars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MediaKind;

    fn post(text: &str) -> ContentItem {
        let mut item = ContentItem::new("a.jpg", Some("1".into()), MediaKind::Image, "https://e.x/a");
        item.user.screen_name = "alice".into();
        item.user.name = "Alice".into();
        item.publish_time = "2024-05-01T08:30:00".into();
        item.full_text = text.into();
        item
    }

    #[test]
    fn test_publish_time_formats() {
        assert_eq!(format_publish_time("2024-05-01T08:30:00"), "2024-05-01 08:30:00");
        assert_eq!(format_publish_time("2024-05-01T08:30:00.123"), "2024-05-01 08:30:00");
        assert_eq!(format_publish_time("2024-05-01T08:30:00+08:00"), "2024-05-01 08:30:00");
        assert_eq!(format_publish_time("yesterday"), "yesterday");
    }

    #[test]
    fn test_short_caption() {
        assert_eq!(
            build_caption(&post("hello"), 1024),
            "#alice Alice\n2024-05-01 08:30:00\nhello"
        );
    }

    #[test]
    fn test_long_caption_is_cut_to_limit() {
        let item = post(&"字".repeat(2000));
        let natural = format!("#alice Alice\n2024-05-01 08:30:00\n{}", item.full_text);

        let caption = build_caption(&item, 1024);

        assert_eq!(caption.chars().count(), 1024);
        assert!(caption.ends_with("..."));
        let body = caption.strip_suffix("...").unwrap();
        assert!(natural.starts_with(body));
    }

    #[test]
    fn test_caption_exactly_at_limit_is_kept() {
        let header = "#alice Alice\n2024-05-01 08:30:00\n";
        let text = "y".repeat(100 - header.chars().count());
        let caption = build_caption(&post(&text), 100);
        assert_eq!(caption.chars().count(), 100);
        assert!(!caption.ends_with("..."));
    }

    #[test]
    fn test_link_text() {
        let mut item = ContentItem::new("space_1", None, MediaKind::Space, "https://x.example.com/i/spaces/1");
        item.user.screen_name = "alice".into();
        item.publish_time = "2024-05-01T08:30:00".into();

        assert_eq!(
            build_link_text(&item, 1024),
            "#alice #spaces\n2024-05-01 08:30:00\nhttps://x.example.com/i/spaces/1"
        );
    }
}
