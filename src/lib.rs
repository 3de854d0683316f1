//! # gradesheet
//!
//! Grade photographed exercise sheets with a multimodal language model.
//!
//! Upload one or more photos of an exercise sheet and get back a structured
//! correction — every exercise, every question, a worked answer for each —
//! as Markdown text and, on request, a downloadable PDF. The model does the
//! grading; this crate does the request construction, the single API call,
//! and the output formatting.
//!
//! ## Pipeline Overview
//!
//! ```text
//! photos
//!  │
//!  ├─ 1. Encode   validate uploads, wrap as base64 data URIs
//!  ├─ 2. Request  one chat-completions payload (system prompt + images
//!  │              + strict correction schema)
//!  ├─ 3. Model    single call to an OpenRouter-compatible endpoint
//!  ├─ 4. Format   structured corrections → Markdown
//!  └─ 5. Export   Markdown → PDF (optional, pure)
//! ```
//!
//! There is exactly one upstream call per submission — no retries, no
//! batching, no caching. A failed call surfaces its error unchanged and
//! leaves nothing partial behind.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gradesheet::{correct, CorrectionRequest, GradingConfig, UploadedImage};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credential read from OPENROUTER_KEY
//!     let config = GradingConfig::from_env();
//!     let request = CorrectionRequest {
//!         images: vec![UploadedImage::new(
//!             "sheet.jpg",
//!             "image/jpeg",
//!             std::fs::read("sheet.jpg")?,
//!         )],
//!         output_language: Some("English".into()),
//!         instructions: None,
//!     };
//!
//!     let correction = correct(&request, &config).await?;
//!     println!("{}", correction.markdown);
//!
//!     let pdf = gradesheet::render_pdf(&correction.markdown)?;
//!     std::fs::write("corrections.pdf", pdf)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `web`   | on      | Enables the `gradesheet` server binary and the [`server`] module (axum + clap + tracing-subscriber) |
//!
//! Disable `web` when using only the library:
//! ```toml
//! gradesheet = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod correct;
pub mod error;
pub mod export;
pub mod output;
pub mod pipeline;
pub mod prompts;

#[cfg(feature = "web")]
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{GradingConfig, GradingConfigBuilder};
pub use correct::{correct, correct_sync};
pub use error::{ErrorKind, GradeError};
pub use export::render_pdf;
pub use output::{Correction, CorrectionDocument, CorrectionStats, Exercise, QuestionAnswer};
pub use pipeline::encode::UploadedImage;
pub use pipeline::request::{build_request, ChatRequest, CorrectionRequest};
