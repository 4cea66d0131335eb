// Prompt constants for interview-question generation.
// The system instruction is fixed for the whole session; the user template is
// parameterised only by the technology name.

use super::CallOptions;

/// System instruction sent with every question request.
pub const INTERVIEWER_SYSTEM: &str = "You are an expert technical interviewer. \
    Generate practical, professional-level interview questions.";

/// Per-technology question prompt. Replace `{technology}` before sending.
pub const QUESTION_PROMPT_TEMPLATE: &str = r#"Generate 1 technical interview question for {technology} technology.

Requirements:
- Assess practical knowledge and problem-solving skills
- Appropriate for professional experience level
- Not too basic or extremely advanced (moderate difficulty)
- Answerable in 2-3 paragraphs
- Focus on real-world scenarios

Return only the question without additional formatting."#;

/// Sampling used for question generation.
pub const QUESTION_CALL_OPTIONS: CallOptions = CallOptions {
    max_tokens: 200,
    temperature: 0.8,
};

/// Renders the user instruction for one technology.
pub fn question_prompt(technology: &str) -> String {
    QUESTION_PROMPT_TEMPLATE.replace("{technology}", technology)
}
