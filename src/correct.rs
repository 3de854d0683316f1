//! Correction entry points.
//!
//! [`correct`] drives the full pipeline for one submission: build the
//! payload, make the single upstream call, parse the structured reply,
//! format it as Markdown. There is no partial success — the caller gets a
//! complete [`Correction`] or an error, and a failed call leaves nothing
//! behind to clean up.

use crate::config::GradingConfig;
use crate::error::GradeError;
use crate::output::{Correction, CorrectionDocument, CorrectionStats};
use crate::pipeline::{format, llm, request};
use crate::pipeline::request::CorrectionRequest;
use std::time::Instant;
use tracing::{debug, info};

/// Grade one submission of photographed exercise sheets.
///
/// # Arguments
/// * `request` — images plus optional language/instruction preferences
/// * `config`  — model, endpoint, credential, timeout
///
/// # Errors
/// * Input class — empty submission, rejected before any network call
/// * Upstream class — missing credential, transport failure, timeout,
///   non-2xx status, or an unusable response body
pub async fn correct(
    request: &CorrectionRequest,
    config: &GradingConfig,
) -> Result<Correction, GradeError> {
    let started = Instant::now();

    // ── Step 1: Build the payload (sole validation point) ────────────────
    let chat = request::build_request(request, config)?;
    info!(
        "Submitting {} image(s) to {}",
        request.images.len(),
        config.model
    );

    // ── Step 2: The one network call ─────────────────────────────────────
    let client = llm::ModelClient::new(config)?;
    let reply = client.complete(&chat).await?;

    // ── Step 3: Parse the structured correction ──────────────────────────
    let document = parse_document(&reply.content)?;
    debug!(
        "Model corrected {} exercise(s)",
        document.exercises.len()
    );

    // ── Step 4: Format as Markdown ───────────────────────────────────────
    let markdown = format::to_markdown(&document);

    let stats = CorrectionStats {
        image_count: request.images.len(),
        input_tokens: reply.prompt_tokens,
        output_tokens: reply.completion_tokens,
        duration_ms: started.elapsed().as_millis() as u64,
        model: config.model.clone(),
    };
    info!(
        "Correction complete: {} exercise(s), {}ms",
        document.exercises.len(),
        stats.duration_ms
    );

    Ok(Correction {
        markdown,
        document,
        stats,
    })
}

/// Synchronous wrapper around [`correct`].
///
/// Creates a temporary tokio runtime internally.
pub fn correct_sync(
    request: &CorrectionRequest,
    config: &GradingConfig,
) -> Result<Correction, GradeError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| GradeError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(correct(request, config))
}

/// Parse the assistant reply into a [`CorrectionDocument`].
fn parse_document(content: &str) -> Result<CorrectionDocument, GradeError> {
    let cleaned = llm::strip_json_fences(content);
    serde_json::from_str(cleaned).map_err(|e| GradeError::MalformedResponse {
        detail: format!("structured correction did not match the schema: {e}"),
    })
}
