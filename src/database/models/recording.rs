use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Only recordings in this state are ever visible through the API
pub const APPROVED_STATUS: &str = "APPROVED";

/// Row of `vkyc_recordings`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Recording {
    pub id: i64,
    pub lan: String,
    pub vkyc_date: DateTime<Utc>,
    pub status: String,
    /// Call length in seconds
    pub call_duration: Option<i32>,
    /// Location on the network share; never sent to clients
    #[serde(skip_serializing, default)]
    pub nfs_file_path: Option<String>,
}

impl Recording {
    pub fn is_approved(&self) -> bool {
        self.status == APPROVED_STATUS
    }

    /// File path, treating blank values as absent
    pub fn file_path(&self) -> Option<&str> {
        self.nfs_file_path.as_deref().map(str::trim).filter(|p| !p.is_empty())
    }
}

/// One window of a filtered listing plus the size of the whole filtered set
#[derive(Debug, Clone, Default)]
pub struct RecordingPage {
    pub total: i64,
    pub items: Vec<Recording>,
}
