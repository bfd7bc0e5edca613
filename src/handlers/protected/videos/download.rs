use axum::extract::{Path, State};

use crate::error::ApiError;
use crate::services::{file_stream, FileDownload};
use crate::state::AppState;

/// GET /api/videos/download/:lan - stream one recording as an attachment
///
/// Lookup and open happen before any byte is sent, so every failure up to
/// that point is a JSON error.
pub async fn download(State(state): State<AppState>, Path(lan): Path<String>) -> Result<FileDownload, ApiError> {
    let download = file_stream::open(state.repository.as_ref(), &lan).await?;
    tracing::info!("Streaming {} ({} bytes) for {}", download.name(), download.size(), lan.trim());
    Ok(download)
}
