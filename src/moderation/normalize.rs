//! Text normalization for match-insensitive comparison.

/// Strip every code point that is not a letter or digit.
///
/// Unicode-aware: CJK ideographs, Cyrillic, accented Latin etc. are kept,
/// while whitespace, punctuation, symbols, emoji and `_` are dropped.
pub fn normalize(text: &str) -> String {
    text.chars().filter(|c| c.is_alphanumeric()).collect()
}
