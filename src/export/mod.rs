//! Document export: correction Markdown → downloadable PDF.
//!
//! Two stages, both pure:
//!
//! 1. [`parse`] — line-oriented classification of the Markdown into styled
//!    blocks. Only headings, bullets, horizontal rules, and `**bold**` /
//!    `*italic*` inline spans are recognised; anything else degrades to a
//!    plain paragraph, never an error.
//! 2. [`pdf`]   — A4 layout of those blocks with built-in Helvetica faces,
//!    greedy word-wrap, and pagination.
//!
//! Determinism: identical input text yields byte-identical output apart
//! from the timestamp/document-id metadata the PDF format embeds.

pub mod parse;
pub mod pdf;

pub use pdf::render_pdf;
