//! Rule-based suggestions. Always available, never empty.

use crate::signals::AnalysisRecord;

pub const MIN_ACTION_VERBS: usize = 5;
pub const MIN_WORDS: usize = 250;
pub const MIN_KEYWORD_COVERAGE: f64 = 50.0;
pub const MIN_BULLETS: usize = 5;

pub const QUANTIFY_ACHIEVEMENTS: &str = "Add measurable achievements: for each role, include 1-2 quantifiable outcomes (e.g., 'reduced cost by 20%').";
pub const IMPROVE_KEYWORDS: &str = "Improve keyword alignment with the job description: include important technologies and terms used in the JD.";
pub const GOOD_KEYWORDS: &str = "Good job on keyword coverage vs the job description. Ensure those keywords appear in context (achievements, not just skills list).";
pub const USE_BULLETS: &str =
    "Use concise bullet points for responsibilities and achievements (3-6 bullets per role).";
pub const ADD_SUMMARY: &str = "Start with a short (2-3 sentences) professional summary that highlights your role, experience, and top skills.";

/// Suggestions in their fixed order.
pub fn suggestions(analysis: &AnalysisRecord, job_supplied: bool) -> Vec<String> {
    let mut out = Vec::new();

    if analysis.action_verb_count < MIN_ACTION_VERBS || analysis.word_count < MIN_WORDS {
        out.push(QUANTIFY_ACHIEVEMENTS.to_string());
    }

    if !analysis.missing_sections.is_empty() {
        out.push(format!(
            "Add or clearly label these sections: {}. Recruiters look for Skills and Experience upfront.",
            analysis.missing_sections.join(", ")
        ));
    }

    if analysis.grammar.errors_count > 0 {
        out.push(format!(
            "Fix grammar & typos ({} issues found). Use consistent tense and bullet punctuation.",
            analysis.grammar.errors_count
        ));
    }

    if job_supplied {
        if analysis.keyword_match.keyword_coverage_percent < MIN_KEYWORD_COVERAGE {
            out.push(IMPROVE_KEYWORDS.to_string());
        } else {
            out.push(GOOD_KEYWORDS.to_string());
        }
    }

    if analysis.bullet_count < MIN_BULLETS {
        out.push(USE_BULLETS.to_string());
    }

    out.push(ADD_SUMMARY.to_string());
    out
}

/// `1. first\n\n2. second ...`
pub fn render_numbered(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, s)| format!("{}. {}", i + 1, s))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn deterministic_feedback(analysis: &AnalysisRecord, job_supplied: bool) -> String {
    render_numbered(&suggestions(analysis, job_supplied))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::{GrammarReport, KeywordMatch};

    fn strong_record() -> AnalysisRecord {
        AnalysisRecord {
            word_count: 400,
            action_verb_count: 8,
            missing_sections: vec![],
            bullet_count: 12,
            grammar: GrammarReport {
                errors_count: 0,
                sample_errors: vec![],
                error: None,
            },
            keyword_match: KeywordMatch {
                semantic_similarity: 0.7,
                keyword_coverage_percent: 80.0,
                job_keyword_count: 10,
                error: None,
            },
        }
    }

    #[test]
    fn test_strong_resume_gets_only_summary_tip_without_job() {
        let items = suggestions(&strong_record(), false);
        assert_eq!(items, vec![ADD_SUMMARY.to_string()]);
    }

    #[test]
    fn test_good_coverage_praised_when_job_supplied() {
        let items = suggestions(&strong_record(), true);
        assert_eq!(items, vec![GOOD_KEYWORDS.to_string(), ADD_SUMMARY.to_string()]);
    }

    #[test]
    fn test_coverage_boundary_at_fifty_is_good() {
        let mut record = strong_record();
        record.keyword_match.keyword_coverage_percent = 50.0;
        assert!(suggestions(&record, true).contains(&GOOD_KEYWORDS.to_string()));
        record.keyword_match.keyword_coverage_percent = 49.9;
        assert!(suggestions(&record, true).contains(&IMPROVE_KEYWORDS.to_string()));
    }

    #[test]
    fn test_weak_resume_gets_every_rule_in_order() {
        let record = AnalysisRecord {
            word_count: 100,
            action_verb_count: 1,
            missing_sections: vec!["+91".to_string(), "LinkedIn".to_string()],
            bullet_count: 0,
            grammar: GrammarReport {
                errors_count: 7,
                sample_errors: vec![],
                error: None,
            },
            keyword_match: KeywordMatch::unavailable("Embedding model not loaded."),
        };
        let items = suggestions(&record, true);
        assert_eq!(items.len(), 6);
        assert_eq!(items[0], QUANTIFY_ACHIEVEMENTS);
        assert!(items[1].contains("+91, LinkedIn"));
        assert!(items[2].contains("(7 issues found)"));
        assert_eq!(items[3], IMPROVE_KEYWORDS);
        assert_eq!(items[4], USE_BULLETS);
        assert_eq!(items[5], ADD_SUMMARY);
    }

    #[test]
    fn test_few_words_alone_triggers_quantify() {
        let mut record = strong_record();
        record.word_count = 249;
        assert_eq!(suggestions(&record, false)[0], QUANTIFY_ACHIEVEMENTS);
    }

    #[test]
    fn test_grammar_sentinel_does_not_trigger_grammar_tip() {
        let mut record = strong_record();
        record.grammar = GrammarReport::unavailable("connection refused");
        assert!(!suggestions(&record, false)
            .iter()
            .any(|s| s.starts_with("Fix grammar")));
    }

    #[test]
    fn test_render_numbered_from_one_with_blank_lines() {
        let text = render_numbered(&["a".to_string(), "b".to_string(), "c".to_string()]);
        assert_eq!(text, "1. a\n\n2. b\n\n3. c");
    }
}
