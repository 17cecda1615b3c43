//! Text extraction from the uploaded PDF.
//!
//! Runs before any external call so an unusable upload never spends a
//! rewrite-service request.

use std::path::Path;

use thiserror::Error;
use tracing::debug;

/// Extracted text shorter than this is treated as a scanned or image-only
/// document.
pub const MIN_TEXT_LEN: usize = 50;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("could not extract readable text from the document")]
    Unreadable,
}

/// Extracts plain text from the spooled upload, trimmed of surrounding
/// whitespace.
///
/// Fails with `Unreadable` when the file cannot be parsed at all or yields
/// less than [`MIN_TEXT_LEN`] characters. Both are terminal for the request;
/// there is no retry path for corrupt input.
pub fn extract_text(path: &Path) -> Result<String, ExtractError> {
    let text = pdf_extract::extract_text(path).map_err(|e| {
        debug!("PDF extraction failed: {e}");
        ExtractError::Unreadable
    })?;

    let text = text.trim().to_string();
    if text.len() < MIN_TEXT_LEN {
        return Err(ExtractError::Unreadable);
    }

    debug!("Extracted {} characters of resume text", text.len());
    Ok(text)
}
