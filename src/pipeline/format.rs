//! Render a structured correction as Markdown.
//!
//! The output shape is deliberately plain — `##` per exercise, an italic
//! given-data line, bold numbered questions, a `---` rule between exercises
//! — so it reads well as text, survives a Markdown download untouched, and
//! maps one-to-one onto the styles the PDF exporter understands.

use crate::output::CorrectionDocument;

/// Given-data strings the model emits when there is nothing to report.
const GIVEN_DATA_PLACEHOLDERS: [&str; 3] = ["none", "n/a", "-"];

/// Format the correction document as Markdown.
pub fn to_markdown(document: &CorrectionDocument) -> String {
    let mut out: Vec<String> = Vec::new();

    for exercise in &document.exercises {
        out.push(format!("## {}", exercise.exercise_name));
        out.push(String::new());

        let given = exercise.given_data.trim();
        if !is_placeholder(given) {
            out.push(format!("*{given}*"));
            out.push(String::new());
        }

        for (i, qa) in exercise.questions.iter().enumerate() {
            out.push(format!("**{}. {}**", i + 1, qa.question));
            out.push(String::new());
            out.push(qa.answer.clone());
            out.push(String::new());
            out.push(String::new());
        }

        out.push("---".to_string());
        out.push(String::new());
    }

    out.join("\n")
}

fn is_placeholder(given: &str) -> bool {
    given.is_empty() || GIVEN_DATA_PLACEHOLDERS.contains(&given.to_lowercase().as_str())
}
