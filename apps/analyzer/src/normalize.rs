//! Text normalizer: the single cleanup pass between extraction and analysis.

/// Collapses every run of whitespace or control characters (NUL included)
/// into a single space and trims both ends.
///
/// The output never contains control characters and `normalize` is idempotent.
pub fn normalize(raw: &str) -> String {
    raw.split(|c: char| c.is_whitespace() || c.is_control())
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whitespace-split token count of already-normalized text.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
