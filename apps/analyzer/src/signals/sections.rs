use std::sync::OnceLock;

use regex::Regex;

/// Labels a complete resume is expected to contain, in canonical order.
/// `+91` stands in for a phone-number contact marker.
pub const REQUIRED_SECTIONS: &[&str] = &[
    "+91",
    "summary",
    "skills",
    "experience",
    "Projects",
    "education",
    "LinkedIn",
];

/// Returns the required labels that do not appear anywhere in `text`
/// (case-insensitive substring search), in canonical order.
pub fn detect_missing_sections(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    REQUIRED_SECTIONS
        .iter()
        .filter(|label| !lower.contains(&label.to_lowercase()))
        .map(|label| label.to_string())
        .collect()
}

fn bullet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\s*[-•*]\s+").expect("valid bullet regex"))
}

/// Number of lines that start with a `-`, `•` or `*` bullet marker.
/// Must run on text that still has its line breaks.
pub fn count_bullets(text: &str) -> usize {
    bullet_re().find_iter(text).count()
}
