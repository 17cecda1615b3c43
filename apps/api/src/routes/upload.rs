//! POST /upload — the single document-transformation entry point.
//!
//! Input validation (file present, media type, size ceiling) happens here as
//! explicit checks before any pipeline stage runs; the pipeline never sees a
//! request that fails these.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
};
use bytes::Bytes;

use crate::errors::AppError;
use crate::state::AppState;

/// Upload size ceiling. The router's body limit sits slightly above this so
/// oversized files reach the explicit check and report 413, not a generic
/// read error.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const UPLOAD_FIELD: &str = "resume";
const ACCEPTED_MEDIA_TYPE: &str = "application/pdf";
const DOWNLOAD_FILENAME: &str = "improved-resume.pdf";

pub async fn upload_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut upload: Option<Bytes> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        if field.content_type() != Some(ACCEPTED_MEDIA_TYPE) {
            return Err(AppError::UnsupportedMediaType);
        }
        let data = field.bytes().await.map_err(multipart_error)?;
        if data.len() > MAX_UPLOAD_BYTES {
            return Err(AppError::FileTooLarge);
        }
        upload = Some(data);
    }

    let upload = upload.ok_or(AppError::MissingFile)?;
    if upload.is_empty() {
        return Err(AppError::MissingFile);
    }

    let rendered = state.pipeline.run(upload).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(ACCEPTED_MEDIA_TYPE),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{DOWNLOAD_FILENAME}\""))
            .expect("static filename is a valid header value"),
    );

    Ok((headers, rendered))
}

/// A body past the router's limit fails mid-read rather than at the explicit
/// size check; multer reports that (and its own size caps) as 413, which must
/// classify as oversized, not as a malformed request.
fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::FileTooLarge
    } else {
        AppError::Multipart(err.to_string())
    }
}
