//! Instruction templates for the correction model.
//!
//! Centralising every prompt here keeps a single source of truth for the
//! correction behaviour and lets unit tests inspect the assembled
//! instructions without a network call. The request builder in
//! [`crate::pipeline::request`] is the only consumer.

/// Base system instruction describing the structured-correction task.
///
/// Language and user-preference directives are appended by
/// [`build_system_prompt`]; this constant is never sent bare.
pub const SYSTEM_PROMPT: &str = r#"You are an expert teacher and exercise corrector. Your task is to:
1. Analyze the uploaded exercise image(s)
2. Extract all exercises, questions, and given data
3. Provide correct, detailed answers for each question

For each exercise, include:
- The exercise name or number
- Any given data or context
- Each question with its complete correct answer and explanation"#;

/// Fixed text part of the user turn; the images carry the actual content.
pub const USER_PROMPT: &str =
    "Please analyze and correct the exercises in the following image(s).";

/// Assemble the full system prompt from the user's settings.
///
/// With no language set, the model is told to answer in the language of the
/// exercise itself — multilingual sheets come back in their own language
/// rather than defaulting to English.
pub fn build_system_prompt(output_language: Option<&str>, instructions: Option<&str>) -> String {
    let mut prompt = String::from(SYSTEM_PROMPT);

    match output_language {
        Some(lang) => {
            prompt.push_str(&format!("\n\nIMPORTANT: Respond in {lang}."));
        }
        None => {
            prompt.push_str("\n\nIMPORTANT: Respond in the same language as the exercise content.");
        }
    }

    if let Some(extra) = instructions {
        prompt.push_str(&format!("\n\nUser preferences: {extra}"));
    }

    prompt
}
