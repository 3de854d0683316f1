//! Result types returned by the correction pipeline.

use serde::{Deserialize, Serialize};

/// One graded submission: the formatted Markdown, the structured document it
/// was formatted from, and per-call statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Correction {
    /// Markdown-flavored correction text, ready for display or export.
    pub markdown: String,
    /// The structured correction as returned by the model.
    pub document: CorrectionDocument,
    /// Statistics for this call.
    pub stats: CorrectionStats,
}

/// Structured correction output, enforced upstream via a strict JSON schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionDocument {
    /// Every exercise found on the uploaded sheets, in reading order.
    pub exercises: Vec<Exercise>,
}

/// One corrected exercise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    /// Name or number of the exercise as printed on the sheet.
    pub exercise_name: String,
    /// Data given in the exercise statement. May be empty or a placeholder
    /// like "none"; the formatter filters those out.
    #[serde(default)]
    pub given_data: String,
    /// The exercise's questions with their corrections.
    pub questions: Vec<QuestionAnswer>,
}

/// A question paired with its corrected answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionAnswer {
    /// The original question text.
    pub question: String,
    /// The correct answer with explanation.
    pub answer: String,
}

/// Statistics for one correction call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorrectionStats {
    /// Number of images submitted.
    pub image_count: usize,
    /// Prompt tokens reported by the provider (0 when not reported).
    pub input_tokens: u64,
    /// Completion tokens reported by the provider (0 when not reported).
    pub output_tokens: u64,
    /// Wall-clock duration of the whole call in milliseconds.
    pub duration_ms: u64,
    /// Model that produced the correction.
    pub model: String,
}
