//! Length-capped text helpers. Lengths are counted in characters.

/// Marker appended to text that was cut.
pub const ELLIPSIS: &str = "...";

/// First `max_chars` characters of `text`.
pub fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Cut `text` to exactly `max_chars` characters ending in an ellipsis when it is longer.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    format!("{}{}", excerpt(text, keep), ELLIPSIS)
}

/// Cut `text` to `max_chars` characters and mark the cut, the way alert bodies are capped.
pub fn cap_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}{}", excerpt(text, max_chars), ELLIPSIS)
    } else {
        text.to_string()
    }
}
