use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::AuthError;
use crate::database::DatabaseError;
use crate::filter::FilterError;
use crate::ingest::ParseError;
use crate::services::bulk_service::BulkError;
use crate::services::file_stream::DownloadError;

/// Every failure a handler can return, rendered as a JSON error body
#[derive(Debug)]
pub enum ApiError {
    BadRequest {
        message: String,
        details: Option<Value>,
    },
    ValidationError {
        message: String,
        details: Option<Value>,
    },
    Unauthorized(String),
    NotFound(String),
    PayloadTooLarge(String),
    InternalServerError {
        message: String,
        /// Diagnostic text, shown only by development deployments
        trace: Option<String>,
    },

    /// Identity provider failures
    BadGateway(String),

    ServiceUnavailable(String),
}

impl ApiError {
    /// Status and machine-readable code sent to the client
    pub fn status(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest { .. } => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::ValidationError { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            ApiError::InternalServerError { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR"),
            ApiError::BadGateway(_) => (StatusCode::BAD_GATEWAY, "BAD_GATEWAY"),
            ApiError::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest { message, .. }
            | ApiError::ValidationError { message, .. }
            | ApiError::InternalServerError { message, .. } => message,
            ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::PayloadTooLarge(msg)
            | ApiError::BadGateway(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    pub fn details(&self) -> Option<&Value> {
        match self {
            ApiError::BadRequest { details, .. }
            | ApiError::ValidationError { details, .. } => details.as_ref(),
            _ => None,
        }
    }

    /// `{"error": true, "code", "message", "details"?}`
    pub fn body(&self) -> Value {
        let mut body = json!({
            "error": true,
            "code": self.status().1,
            "message": self.message(),
        });
        if let Some(details) = self.details() {
            body["details"] = details.clone();
        }
        body
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_request_with(message: impl Into<String>, details: Value) -> Self {
        ApiError::BadRequest {
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn validation_error(message: impl Into<String>, details: Option<Value>) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            details,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        ApiError::PayloadTooLarge(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError {
            message: message.into(),
            trace: None,
        }
    }

    /// Internal error carrying diagnostic text; see [`ErrorTrace`]
    pub fn internal_with_trace(message: impl Into<String>, trace: impl std::fmt::Display) -> Self {
        ApiError::InternalServerError {
            message: message.into(),
            trace: Some(trace.to_string()),
        }
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        ApiError::BadGateway(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::Sqlx(sqlx::Error::PoolTimedOut) => {
                tracing::error!("Database pool timed out");
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            other => {
                tracing::error!("Database query error: {}", other);
                ApiError::internal_with_trace("An error occurred while processing your request", &other)
            }
        }
    }
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        let field = err.field();
        ApiError::validation_error(err.to_string(), Some(json!({ "field": field })))
    }
}

impl From<ParseError> for ApiError {
    fn from(err: ParseError) -> Self {
        ApiError::bad_request_with("Error processing CSV/TXT file.", json!(err.to_string()))
    }
}

impl From<BulkError> for ApiError {
    fn from(err: BulkError) -> Self {
        match err {
            BulkError::SizeOutOfRange { count, min, max } => ApiError::validation_error(
                err.to_string(),
                Some(json!({ "count": count, "min": min, "max": max })),
            ),
            BulkError::NotFound | BulkError::NoAccessibleFiles => ApiError::not_found(err.to_string()),
            BulkError::Parse(parse) => parse.into(),
            BulkError::Database(db) => db.into(),
        }
    }
}

impl From<DownloadError> for ApiError {
    fn from(err: DownloadError) -> Self {
        match err {
            DownloadError::MissingLan => ApiError::bad_request(err.to_string()),
            DownloadError::NoFilePath | DownloadError::FileMissing => ApiError::not_found(err.to_string()),
            DownloadError::Open { .. } => {
                tracing::error!("Recording unreadable: {}", err);
                ApiError::internal_with_trace("Error streaming file.", &err)
            }
            DownloadError::Database(db) => db.into(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Provider(_) | AuthError::Http(_) => {
                tracing::error!("Identity provider error: {}", err);
                ApiError::bad_gateway("Identity provider unavailable")
            }
            AuthError::NotConfigured(setting) => {
                tracing::error!("Authentication is not configured: {} missing", setting);
                ApiError::internal_server_error("Authentication is not configured")
            }
            AuthError::Signing(_) => {
                tracing::error!("Session signing failed: {}", err);
                ApiError::internal_server_error("Failed to establish session")
            }
            _ => ApiError::unauthorized("Authentication required."),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for ApiError {}

/// Diagnostic text of an internal failure, riding along in the response
/// extensions. `middleware::error_trace_middleware` copies it into `details`
/// for development configs and drops it otherwise.
#[derive(Debug, Clone)]
pub struct ErrorTrace(pub String);

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let mut response = (self.status().0, Json(self.body())).into_response();
        if let ApiError::InternalServerError { trace: Some(trace), .. } = self {
            response.extensions_mut().insert(ErrorTrace(trace));
        }
        response
    }
}
