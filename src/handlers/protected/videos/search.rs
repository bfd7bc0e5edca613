use axum::extract::{Query, State};
use serde::Deserialize;

use crate::database::Recording;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub lan: Option<String>,
}

/// GET /api/videos/search?lan= - exact lookup of one recording
pub async fn search(State(state): State<AppState>, Query(query): Query<SearchQuery>) -> ApiResult<Recording> {
    let lan = query
        .lan
        .as_deref()
        .filter(|lan| !lan.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("LAN parameter is required."))?;

    let recording = state
        .repository
        .get_by_lan(lan)
        .await?
        .ok_or_else(|| ApiError::not_found("Video not found for the given LAN."))?;

    Ok(ApiResponse::success(recording))
}
