use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    Extension,
};
use serde_json::json;

use crate::auth::Principal;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::types::{BulkAccepted, MessageResponse};

const UPLOAD_FIELD: &str = "file";
const ALLOWED_EXTENSIONS: [&str; 2] = ["csv", "txt"];

/// POST /api/videos/bulk-request - register a batch of LANs from a file
///
/// Multipart body with a `file` part (.csv or .txt). Responds 202:
///
/// ```json
/// {
///   "message": "Bulk request received and processing",
///   "data": { "requestId": "…", "lanIds": ["LAN1", "LAN2"], "expiresAt": "…" }
/// }
/// ```
pub async fn bulk_request(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<MessageResponse<BulkAccepted>> {
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!("Rejected bulk upload body: {}", e);
        ApiError::bad_request("No file uploaded.")
    })?;
    let content = read_upload(&mut multipart).await?;

    let request = state.bulk.submit(&content).await?;
    tracing::info!(
        "Bulk request {} accepted from {} with {} LAN IDs",
        request.request_id,
        principal.id,
        request.lan_ids.len()
    );

    Ok(ApiResponse::accepted(MessageResponse::with_data(
        "Bulk request received and processing",
        request.into(),
    )))
}

/// Bytes of the first `file` part
async fn read_upload(multipart: &mut Multipart) -> Result<Bytes, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        if let Some(file_name) = field.file_name() {
            let extension = std::path::Path::new(file_name)
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase);
            if !extension.is_some_and(|e| ALLOWED_EXTENSIONS.contains(&e.as_str())) {
                return Err(ApiError::bad_request("Only .csv or .txt files are accepted."));
            }
        }

        return field.bytes().await.map_err(upload_error);
    }

    Err(ApiError::bad_request("No file uploaded."))
}

fn upload_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::payload_too_large("Uploaded file is too large.");
    }
    ApiError::bad_request_with("Error processing CSV/TXT file.", json!(err.body_text()))
}
