use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::Response,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::services::{archive, storage, BulkError};
use crate::state::AppState;

pub const SKIPPED_LANS_HEADER: HeaderName = HeaderName::from_static("x-skipped-lans");
pub const SKIPPED_COUNT_HEADER: HeaderName = HeaderName::from_static("x-skipped-count");

/// GET /api/videos/bulk-download/:requestId - stream the batch as a ZIP
///
/// LANs without an accessible file are left out of the archive and listed
/// in `X-Skipped-Lans` / `X-Skipped-Count`.
pub async fn bulk_download(
    State(state): State<AppState>,
    Path(request_id): Path<String>,
) -> Result<Response, ApiError> {
    // A malformed id can never name a stored request
    let request_id = Uuid::parse_str(&request_id).map_err(|_| BulkError::NotFound)?;
    let batch = state.bulk.resolve(request_id, state.repository.as_ref()).await?;

    tracing::info!(
        "Bulk download {}: {} files, {} skipped",
        request_id,
        batch.entries.len(),
        batch.skipped.len()
    );

    let filename = archive::archive_filename(request_id);
    let body = Body::from_stream(archive::stream_archive(request_id, batch.entries));

    let mut response = Response::new(body);
    *response.status_mut() = StatusCode::OK;
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/zip"));
    headers.insert(header::CONTENT_DISPOSITION, storage::content_disposition(&filename));
    headers.insert(SKIPPED_COUNT_HEADER, HeaderValue::from(batch.skipped.len()));
    if !batch.skipped.is_empty() {
        match HeaderValue::from_str(&batch.skipped.join(",")) {
            Ok(value) => {
                headers.insert(SKIPPED_LANS_HEADER, value);
            }
            Err(_) => tracing::warn!("Skipped LANs for {} are not valid header text", request_id),
        }
    }

    Ok(response)
}
