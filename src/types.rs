/// Response payloads shared between handlers and tests

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::Recording;
use crate::services::BulkRequest;

/// `GET /api/videos` body
#[derive(Debug, Serialize, Deserialize)]
pub struct VideoListResponse {
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub videos: Vec<Recording>,
}

/// `data` member of the bulk-request acceptance body
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkAccepted {
    pub request_id: Uuid,
    pub lan_ids: Vec<String>,
    pub expires_at: DateTime<Utc>,
}

impl From<BulkRequest> for BulkAccepted {
    fn from(request: BulkRequest) -> Self {
        Self {
            request_id: request.request_id,
            lan_ids: request.lan_ids,
            expires_at: request.expires_at,
        }
    }
}

/// Body carrying only a human-readable message, plus optional payload
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse<T = ()> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }
}

impl<T> MessageResponse<T> {
    pub fn with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
        }
    }
}
