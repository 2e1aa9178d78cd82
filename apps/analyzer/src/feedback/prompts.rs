// Prompt constants and the prompt builder for generative resume review.
// All generative calls go through llm_client; this file only assembles text.

use crate::signals::AnalysisRecord;

/// Resume text beyond this many characters is not sent to the model.
pub const MAX_RESUME_CHARS: usize = 3000;
/// Job description text beyond this many characters is not sent to the model.
pub const MAX_JOB_CHARS: usize = 2000;

pub const REVIEWER_INSTRUCTIONS: &[&str] = &[
    "You are a professional resume reviewer. Provide 4-6 actionable, concise suggestions (numbered).",
    "Focus on structure, clarity, achievements (quantifiable results), keywords, and formatting.",
    "Be polite and constructive. Keep each suggestion to one short paragraph.",
];

pub const JOB_FIT_INSTRUCTION: &str =
    "Also include one short comment on how well this resume matches the provided job description.";

/// Builds the review prompt: instructions, truncated resume, the serialized
/// analysis and (when present) the truncated job description.
pub fn build_review_prompt(
    resume_text: &str,
    analysis: &AnalysisRecord,
    job_description: Option<&str>,
) -> String {
    let mut instructions: Vec<&str> = REVIEWER_INSTRUCTIONS.to_vec();
    if job_description.is_some() {
        instructions.push(JOB_FIT_INSTRUCTION);
    }

    let analysis_json = serde_json::to_string_pretty(analysis).unwrap_or_else(|_| format!("{analysis:?}"));

    let mut prompt = instructions.join("\n");
    prompt.push_str("\n\n");
    prompt.push_str("RESUME START\n");
    prompt.push_str(&truncate_chars(resume_text, MAX_RESUME_CHARS));
    prompt.push_str("\nRESUME END\n\n");
    prompt.push_str("ANALYSIS:\n");
    prompt.push_str(&analysis_json);
    prompt.push_str("\n\n");
    if let Some(job) = job_description {
        prompt.push_str("JOB DESCRIPTION:\n");
        prompt.push_str(&truncate_chars(job, MAX_JOB_CHARS));
        prompt.push_str("\n\n");
    }
    prompt
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
