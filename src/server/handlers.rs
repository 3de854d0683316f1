//! Route handlers.

use crate::correct::correct;
use crate::error::GradeError;
use crate::export;
use crate::output::{CorrectionStats, Exercise};
use crate::pipeline::encode::UploadedImage;
use crate::pipeline::request::CorrectionRequest;
use crate::server::AppState;
use axum::body::Body;
use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::{Html, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;

/// The embedded single-page UI.
pub async fn index() -> Html<&'static str> {
    Html(include_str!("../../assets/index.html"))
}

/// Liveness probe.
pub async fn healthz() -> &'static str {
    "ok"
}

/// JSON body of a successful correction.
#[derive(Debug, Serialize)]
pub struct CorrectionResponse {
    pub markdown: String,
    pub exercises: Vec<Exercise>,
    pub stats: CorrectionStats,
}

/// Grade an uploaded submission.
///
/// Multipart fields: `image` (repeatable file part), `language`,
/// `instructions` (optional text). Unknown fields are ignored.
#[instrument(skip_all)]
pub async fn submit_correction(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<CorrectionResponse>, GradeError> {
    let mut images: Vec<UploadedImage> = Vec::new();
    let mut language: Option<String> = None;
    let mut instructions: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| GradeError::BadUpload {
            detail: e.to_string(),
        })?
    {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "image" => {
                let file_name = field
                    .file_name()
                    .unwrap_or("upload")
                    .to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| GradeError::BadUpload {
                    detail: format!("failed to read '{file_name}': {e}"),
                })?;
                images.push(UploadedImage::from_upload(
                    file_name,
                    content_type.as_deref(),
                    bytes.to_vec(),
                )?);
            }
            "language" => {
                language = non_empty(field.text().await.map_err(bad_field)?);
            }
            "instructions" => {
                instructions = non_empty(field.text().await.map_err(bad_field)?);
            }
            _ => {}
        }
    }

    let request = CorrectionRequest {
        images,
        output_language: language,
        instructions,
    };
    let correction = correct(&request, &state.config).await?;

    Ok(Json(CorrectionResponse {
        markdown: correction.markdown,
        exercises: correction.document.exercises,
        stats: correction.stats,
    }))
}

/// Export request body shared by both download endpoints.
#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub markdown: String,
}

/// Offer the raw correction text as a Markdown download.
pub async fn export_markdown(
    Json(request): Json<ExportRequest>,
) -> Result<Response, GradeError> {
    attachment(
        "text/markdown; charset=utf-8",
        "corrections.md",
        request.markdown.into_bytes(),
    )
}

/// Render the correction text as a PDF download.
#[instrument(skip_all)]
pub async fn export_pdf(Json(request): Json<ExportRequest>) -> Result<Response, GradeError> {
    let bytes = export::render_pdf(&request.markdown)?;
    attachment("application/pdf", "corrections.pdf", bytes)
}

fn attachment(
    content_type: &str,
    file_name: &str,
    bytes: Vec<u8>,
) -> Result<Response, GradeError> {
    Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{file_name}\""),
        )
        .body(Body::from(bytes))
        .map_err(|e| GradeError::Internal(e.to_string()))
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn bad_field(e: axum::extract::multipart::MultipartError) -> GradeError {
    GradeError::BadUpload {
        detail: e.to_string(),
    }
}
