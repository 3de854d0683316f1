//! Request construction: uploads + options → one chat-completions payload.
//!
//! This is the only stage that can reject a submission, and it does so
//! before any network activity: an empty image set never reaches the wire.
//!
//! ## Payload Layout
//!
//! The request contains (in order):
//! 1. **System message** — the correction instructions from
//!    [`crate::prompts`], with the language and preference directives folded
//!    in.
//! 2. **User message** — a short fixed text part followed by one
//!    `image_url` part per uploaded image, each a base64 data URI.
//! 3. **`response_format`** — a strict JSON schema forcing the structured
//!    exercise/question/answer shape that the formatter consumes.

use crate::config::GradingConfig;
use crate::error::GradeError;
use crate::pipeline::encode::UploadedImage;
use crate::prompts;
use serde::Serialize;
use serde_json::{json, Value};

/// One user submission: images plus optional output preferences.
#[derive(Debug, Clone, Default)]
pub struct CorrectionRequest {
    /// The photographed pages, in upload order.
    pub images: Vec<UploadedImage>,
    /// Language the correction should be written in. `None` means "the
    /// language of the exercise itself".
    pub output_language: Option<String>,
    /// Free-text instructions appended to the system prompt.
    pub instructions: Option<String>,
}

/// Serialisable chat-completions payload.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub response_format: Value,
}

/// One message in the conversation.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: MessageContent,
}

/// Message content: either a bare string (system turn) or a list of typed
/// parts (user turn with images).
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// A typed content part, serialised in the OpenAI content-parts format:
/// `{"type": "text", ...}` or `{"type": "image_url", ...}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

impl ChatRequest {
    /// Number of image attachments in the payload.
    pub fn image_part_count(&self) -> usize {
        self.messages
            .iter()
            .filter_map(|m| match &m.content {
                MessageContent::Parts(parts) => Some(parts),
                MessageContent::Text(_) => None,
            })
            .flatten()
            .filter(|p| matches!(p, ContentPart::ImageUrl { .. }))
            .count()
    }
}

/// Build the outbound payload for one submission.
///
/// # Errors
/// [`GradeError::NoImages`] when the submission holds no images; no other
/// validation is performed here.
pub fn build_request(
    request: &CorrectionRequest,
    config: &GradingConfig,
) -> Result<ChatRequest, GradeError> {
    if request.images.is_empty() {
        return Err(GradeError::NoImages);
    }

    let system_prompt = prompts::build_system_prompt(
        request.output_language.as_deref(),
        request.instructions.as_deref(),
    );

    let mut parts = Vec::with_capacity(request.images.len() + 1);
    parts.push(ContentPart::Text {
        text: prompts::USER_PROMPT.to_string(),
    });
    for image in &request.images {
        parts.push(ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: image.to_data_uri(),
            },
        });
    }

    Ok(ChatRequest {
        model: config.model.clone(),
        messages: vec![
            ChatMessage {
                role: "system",
                content: MessageContent::Text(system_prompt),
            },
            ChatMessage {
                role: "user",
                content: MessageContent::Parts(parts),
            },
        ],
        temperature: config.temperature,
        max_tokens: config.max_tokens,
        response_format: correction_schema(),
    })
}

/// Strict JSON schema for the structured correction output.
///
/// Mirrors [`crate::output::CorrectionDocument`]; `strict: true` makes
/// compliant providers reject any drift from this shape instead of
/// improvising.
pub fn correction_schema() -> Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": "exercise_correction",
            "strict": true,
            "schema": {
                "type": "object",
                "properties": {
                    "exercises": {
                        "type": "array",
                        "description": "List of exercises with their corrections",
                        "items": {
                            "type": "object",
                            "properties": {
                                "exercise_name": {
                                    "type": "string",
                                    "description": "Name or number of the exercise"
                                },
                                "given_data": {
                                    "type": "string",
                                    "description": "Data provided in the exercise"
                                },
                                "questions": {
                                    "type": "array",
                                    "description": "List of questions and their answers",
                                    "items": {
                                        "type": "object",
                                        "properties": {
                                            "question": {
                                                "type": "string",
                                                "description": "The original question text"
                                            },
                                            "answer": {
                                                "type": "string",
                                                "description": "The correct answer with explanation"
                                            }
                                        },
                                        "required": ["question", "answer"],
                                        "additionalProperties": false
                                    }
                                }
                            },
                            "required": ["exercise_name", "given_data", "questions"],
                            "additionalProperties": false
                        }
                    }
                },
                "required": ["exercises"],
                "additionalProperties": false
            }
        }
    })
}
