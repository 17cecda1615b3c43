use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extract::ExtractError;
use crate::render::RenderError;
use crate::rewrite::GenerationError;

const MAX_FILE_SIZE_MB: usize = 10;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every variant maps to a distinct HTTP status and a `{ "error": string }` body.
/// Raw upstream/internal messages are logged, never sent to the client.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("File exceeds the {MAX_FILE_SIZE_MB} MB limit")]
    FileTooLarge,

    #[error("Unsupported media type")]
    UnsupportedMediaType,

    #[error("Malformed multipart request: {0}")]
    Multipart(String),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::MissingFile => (
                StatusCode::BAD_REQUEST,
                "No file uploaded. Please attach a PDF.".to_string(),
            ),
            AppError::FileTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                format!("File too large. Maximum size is {MAX_FILE_SIZE_MB} MB."),
            ),
            AppError::UnsupportedMediaType => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Only PDF files are accepted.".to_string(),
            ),
            AppError::Multipart(msg) => {
                tracing::warn!("Multipart error: {msg}");
                (
                    StatusCode::BAD_REQUEST,
                    "Could not read the uploaded file. Please try again.".to_string(),
                )
            }
            AppError::Extract(ExtractError::Unreadable) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Could not extract readable text from the PDF. Ensure it is not scanned/image-based."
                    .to_string(),
            ),
            AppError::Generation(e) => {
                tracing::error!("Generation error: {e}");
                match e {
                    GenerationError::Throttled => (
                        StatusCode::TOO_MANY_REQUESTS,
                        "AI service rate limit reached. Please try again shortly.".to_string(),
                    ),
                    GenerationError::Timeout => (
                        StatusCode::GATEWAY_TIMEOUT,
                        "The AI service took too long to respond. Please try again.".to_string(),
                    ),
                    _ => (
                        StatusCode::BAD_GATEWAY,
                        "AI returned an unexpected response. Please try again.".to_string(),
                    ),
                }
            }
            AppError::Render(e) => {
                tracing::error!("Render error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong processing your resume. Please try again.".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong processing your resume. Please try again.".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": message }));

        (status, body).into_response()
    }
}
