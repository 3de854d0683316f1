//! Upload validation and encoding: raw bytes → base64 data URI.
//!
//! The correction API accepts images as base64 data-URIs embedded in the
//! JSON request body. Browsers usually send a usable `Content-Type` with
//! each upload, but drag-and-drop and some mobile clients do not, so the
//! type is sniffed from magic bytes whenever the declared one is missing or
//! not in the accepted set.

use crate::error::GradeError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;
use tracing::debug;

/// Image mime types the correction model accepts.
const SUPPORTED_MIME_TYPES: [&str; 4] = ["image/png", "image/jpeg", "image/webp", "image/gif"];

/// One photographed exercise page, held in memory for a single request.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Original file name, used only in error messages.
    pub name: String,
    /// Mime type, one of [`SUPPORTED_MIME_TYPES`].
    pub mime_type: String,
    /// Raw image bytes as uploaded.
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    /// Wrap bytes whose mime type is already known and trusted.
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Build from an untrusted upload, sniffing the type when the declared
    /// one is absent or not accepted.
    ///
    /// # Errors
    /// [`GradeError::UnsupportedImage`] when the bytes are not a decodable
    /// PNG/JPEG/WebP/GIF.
    pub fn from_upload(
        name: impl Into<String>,
        declared_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<Self, GradeError> {
        let name = name.into();

        if let Some(declared) = declared_type {
            if SUPPORTED_MIME_TYPES.contains(&declared) {
                return Ok(Self::new(name, declared, bytes));
            }
        }

        let format = image::guess_format(&bytes).map_err(|e| GradeError::UnsupportedImage {
            name: name.clone(),
            detail: e.to_string(),
        })?;
        match format {
            ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::WebP | ImageFormat::Gif => {
                debug!("Sniffed '{}' as {}", name, format.to_mime_type());
                Ok(Self::new(name, format.to_mime_type(), bytes))
            }
            other => Err(GradeError::UnsupportedImage {
                name,
                detail: format!("detected {}", other.to_mime_type()),
            }),
        }
    }

    /// Encode as a `data:` URI for the `image_url` content part.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}
