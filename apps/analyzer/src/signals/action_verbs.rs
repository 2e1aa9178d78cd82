use std::sync::OnceLock;

use regex::Regex;

/// Closed vocabulary of achievement verbs, lower-case.
pub const ACTION_VERBS: &[&str] = &[
    "achieved",
    "improved",
    "managed",
    "led",
    "created",
    "designed",
    "implemented",
    "reduced",
    "increased",
    "developed",
    "engineered",
    "launched",
    "optimized",
    "automated",
    "orchestrated",
    "resolved",
    "boosted",
    "coordinated",
    "spearheaded",
    "delivered",
    "built",
    "founded",
    "mentored",
    "trained",
    "negotiated",
];

fn word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[a-zA-Z]+\b").expect("valid word regex"))
}

/// Counts every occurrence of a vocabulary verb. Case-insensitive, whole
/// alphabetic words only ("led" does not match inside "settled").
pub fn count_action_verbs(text: &str) -> usize {
    let lower = text.to_lowercase();
    word_re()
        .find_iter(&lower)
        .filter(|m| ACTION_VERBS.contains(&m.as_str()))
        .count()
}
