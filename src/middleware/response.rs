use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::Value;

use crate::config::AppConfig;
use crate::error::ErrorTrace;

/// Successful JSON payload, sent without an envelope. Failures go through
/// `ApiError` instead.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self { data, status: StatusCode::OK }
    }

    /// Bulk submissions are accepted before any file is resolved
    pub fn accepted(data: T) -> Self {
        Self { data, status: StatusCode::ACCEPTED }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.data)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

/// Error bodies are small JSON documents built by `ApiError`
const ERROR_BODY_LIMIT: usize = 64 * 1024;

/// Surfaces [`ErrorTrace`] as the error body's `details` in development;
/// other environments only ever send the generic message.
pub async fn error_trace_middleware(
    State(config): State<Arc<AppConfig>>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let Some(ErrorTrace(trace)) = response.extensions_mut().remove::<ErrorTrace>() else {
        return response;
    };
    if !config.is_development() {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let mut json = match to_bytes(body, ERROR_BODY_LIMIT).await {
        Ok(bytes) => serde_json::from_slice::<Value>(&bytes).unwrap_or_default(),
        Err(e) => {
            tracing::warn!("Could not read error body to attach trace: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    json["details"] = Value::String(trace);

    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(json.to_string()))
}
