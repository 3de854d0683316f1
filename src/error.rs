//! Error types for the gradesheet library.
//!
//! A single [`GradeError`] enum covers every failure mode, grouped into the
//! three classes a caller can meaningfully react to (see [`ErrorKind`]):
//!
//! * **Input** — the submission itself is unusable (no images, or an upload
//!   that is not a decodable image). The user fixes the form and retries.
//! * **Upstream** — the correction model could not be reached or answered
//!   with something unusable. Nothing is retried automatically; the message
//!   carries whatever the provider said.
//! * **Export** — PDF generation failed. The on-screen correction and the
//!   Markdown download are unaffected.
//!
//! None of these are fatal to the process; the web layer maps each class to
//! an HTTP status and the user simply retries the action.

use thiserror::Error;

/// Coarse classification of a [`GradeError`], used for HTTP status mapping
/// and for callers that only care which stage failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The submission was rejected before any network activity.
    Input,
    /// The external correction model failed or misbehaved.
    Upstream,
    /// Turning the correction text into a document failed.
    Export,
    /// Configuration or internal plumbing problem.
    Internal,
}

/// All errors returned by the gradesheet library.
#[derive(Debug, Error)]
pub enum GradeError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The correction request contained no images at all.
    #[error("No exercise images were provided.\nUpload at least one photographed sheet before requesting a correction.")]
    NoImages,

    /// An upload was not one of the accepted image types.
    #[error("'{name}' is not a supported image: {detail}\nAccepted types: PNG, JPEG, WebP, GIF.")]
    UnsupportedImage { name: String, detail: String },

    /// The multipart form itself could not be read.
    #[error("Could not read the uploaded form data: {detail}")]
    BadUpload { detail: String },

    // ── Upstream errors ───────────────────────────────────────────────────
    /// No API credential is configured.
    #[error("The correction model credential is not configured.\nSet the OPENROUTER_KEY environment variable and restart.")]
    ApiKeyMissing,

    /// The HTTP request to the model could not be sent or completed.
    #[error("Request to the correction model failed: {reason}")]
    UpstreamRequest { reason: String },

    /// The model call exceeded the configured timeout.
    #[error("The correction model did not answer within {secs}s")]
    UpstreamTimeout { secs: u64 },

    /// The model answered with a non-success HTTP status.
    #[error("The correction model returned HTTP {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    /// The model answered 2xx but the body was empty or not the expected shape.
    #[error("The correction model returned an unusable response: {detail}")]
    MalformedResponse { detail: String },

    // ── Export errors ─────────────────────────────────────────────────────
    /// PDF rendering failed.
    #[error("PDF export failed: {detail}")]
    ExportFailed { detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GradeError {
    /// Which class this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GradeError::NoImages
            | GradeError::UnsupportedImage { .. }
            | GradeError::BadUpload { .. } => ErrorKind::Input,
            GradeError::ApiKeyMissing
            | GradeError::UpstreamRequest { .. }
            | GradeError::UpstreamTimeout { .. }
            | GradeError::UpstreamStatus { .. }
            | GradeError::MalformedResponse { .. } => ErrorKind::Upstream,
            GradeError::ExportFailed { .. } => ErrorKind::Export,
            GradeError::InvalidConfig(_) | GradeError::Internal(_) => ErrorKind::Internal,
        }
    }
}
