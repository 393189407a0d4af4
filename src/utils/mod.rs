//! Utility functions.
//!
//! Collection of helper functions used across the bot.

/// Mask an API key for logging: first 7 chars + `***` + last 4.
///
/// Keys of 11 chars or fewer are fully masked.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 11 {
        return "***".to_string();
    }

    let head: String = chars[..7].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}***{}", head, tail)
}

/// First `max_chars` characters of `text` for log lines, with `...` when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Render `items` as a 1-based numbered list, one per line.
pub fn numbered_list<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("short"), "***");
        assert_eq!(mask_token("12345678901"), "***");
        assert_eq!(mask_token("sk-abcdefghijklmnop1234"), "sk-abcd***1234");
    }

    #[test]
    fn test_preview_is_char_safe() {
        assert_eq!(preview("广告广告广告", 2), "广告...");
        assert_eq!(preview("hi", 50), "hi");
    }

    #[test]
    fn test_numbered_list() {
        assert_eq!(numbered_list(&["ad", "promo"]), "1. ad\n2. promo");
        assert_eq!(numbered_list::<i64>(&[]), "");
    }
}
