use axum::extract::{rejection::QueryRejection, Query, State};

use crate::error::ApiError;
use crate::filter::{ListQuery, VideoFilter};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::types::VideoListResponse;

/// GET /api/videos - filtered, sorted, paginated listing
///
/// Query: `page`, `limit`, `sortBy`, `sortOrder`, `search`, `date`, `month`,
/// `year`. All optional.
///
/// ```json
/// { "total": 42, "page": 1, "limit": 10, "videos": [ { "id": 7, "lan": "LAN0007", ... } ] }
/// ```
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<VideoListResponse> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let filter = VideoFilter::from_query(&query, &state.config.listing)?;

    let page = state.repository.list_filtered(&filter).await?;

    Ok(ApiResponse::success(VideoListResponse {
        total: page.total,
        page: filter.page,
        limit: filter.limit,
        videos: page.items,
    }))
}
