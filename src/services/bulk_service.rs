use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::{DatabaseError, Recording, RecordingRepository};
use crate::ingest::{self, ParseError};
use crate::services::archive::ArchiveEntry;
use crate::services::storage;

/// Accepted batch size after de-duplication
pub const MIN_LAN_IDS: usize = 2;
pub const MAX_LAN_IDS: usize = 50;

/// Shortest period a sweeper will tick at
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, thiserror::Error)]
pub enum BulkError {
    #[error("File must contain between {min} and {max} LAN IDs. Found {count}.")]
    SizeOutOfRange { count: usize, min: usize, max: usize },
    #[error("Bulk request data not found or expired.")]
    NotFound,
    #[error("No valid video files found for the bulk request.")]
    NoAccessibleFiles,
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkRequest {
    pub request_id: Uuid,
    pub lan_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl BulkRequest {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// A bulk request joined against the repository and the share
#[derive(Debug)]
pub struct ResolvedBatch {
    pub request_id: Uuid,
    /// Downloadable files, in submission order
    pub entries: Vec<ArchiveEntry>,
    /// LANs with no approved recording, no file path, or no file on the share
    pub skipped: Vec<String>,
}

/// Holds submitted batches between upload and download. Entries live for
/// `ttl` and are evicted lazily on lookup and periodically by the sweeper.
pub struct BulkRequestService {
    requests: RwLock<HashMap<Uuid, BulkRequest>>,
    ttl: chrono::Duration,
}

impl BulkRequestService {
    pub fn new(ttl: Duration) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::minutes(15));
        Self {
            requests: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// De-duplicate (first occurrence wins) and enforce the batch bounds
    pub fn validate(lan_ids: Vec<String>) -> Result<Vec<String>, BulkError> {
        let mut seen = HashSet::new();
        let unique: Vec<String> = lan_ids.into_iter().filter(|lan| seen.insert(lan.clone())).collect();

        if !(MIN_LAN_IDS..=MAX_LAN_IDS).contains(&unique.len()) {
            return Err(BulkError::SizeOutOfRange {
                count: unique.len(),
                min: MIN_LAN_IDS,
                max: MAX_LAN_IDS,
            });
        }
        Ok(unique)
    }

    /// Parse an uploaded file and register the batch
    pub async fn submit(&self, content: &[u8]) -> Result<BulkRequest, BulkError> {
        let lan_ids = Self::validate(ingest::parse_lan_ids(content)?)?;

        let created_at = Utc::now();
        let request = BulkRequest {
            request_id: Uuid::new_v4(),
            lan_ids,
            created_at,
            expires_at: created_at + self.ttl,
        };

        self.requests.write().await.insert(request.request_id, request.clone());
        tracing::info!(
            "Bulk request {} registered with {} LAN IDs",
            request.request_id,
            request.lan_ids.len()
        );
        Ok(request)
    }

    pub async fn get(&self, request_id: Uuid) -> Result<BulkRequest, BulkError> {
        let now = Utc::now();
        {
            let requests = self.requests.read().await;
            match requests.get(&request_id) {
                Some(request) if !request.is_expired(now) => return Ok(request.clone()),
                Some(_) => {}
                None => return Err(BulkError::NotFound),
            }
        }

        // Expired: drop it now rather than waiting for the sweeper
        let mut requests = self.requests.write().await;
        if requests.get(&request_id).is_some_and(|r| r.is_expired(now)) {
            requests.remove(&request_id);
            tracing::debug!("Bulk request {} expired", request_id);
        }
        Err(BulkError::NotFound)
    }

    /// Look up recordings and probe their files. LANs that cannot be served
    /// are reported in `skipped`; an empty result is an error.
    pub async fn resolve(
        &self,
        request_id: Uuid,
        repository: &dyn RecordingRepository,
    ) -> Result<ResolvedBatch, BulkError> {
        let request = self.get(request_id).await?;
        let recordings = repository.get_many_by_lan(&request.lan_ids).await?;

        let mut by_lan: HashMap<&str, &Recording> = HashMap::with_capacity(recordings.len());
        for recording in &recordings {
            by_lan.entry(recording.lan.as_str()).or_insert(recording);
        }

        let probes = request.lan_ids.iter().map(|lan| {
            let path = by_lan.get(lan.as_str()).and_then(|r| r.file_path());
            async move {
                match path {
                    Some(path) => storage::probe(path).await,
                    None => None,
                }
            }
        });
        let files = join_all(probes).await;

        let mut entries = Vec::new();
        let mut skipped = Vec::new();
        for (lan, file) in request.lan_ids.iter().zip(files) {
            match file {
                Some(file) => entries.push(ArchiveEntry::new(lan, file)),
                None => skipped.push(lan.clone()),
            }
        }

        if entries.is_empty() {
            tracing::warn!("Bulk request {}: none of {} LANs downloadable", request_id, skipped.len());
            return Err(BulkError::NoAccessibleFiles);
        }
        if !skipped.is_empty() {
            tracing::warn!("Bulk request {}: skipping {:?}", request_id, skipped);
        }

        Ok(ResolvedBatch { request_id, entries, skipped })
    }

    /// Remove every expired request; returns how many were dropped
    pub async fn evict_expired(&self) -> usize {
        let now = Utc::now();
        let mut requests = self.requests.write().await;
        let before = requests.len();
        requests.retain(|_, request| !request.is_expired(now));
        before - requests.len()
    }

    /// Periodic eviction. The task stops once the service is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        let service: Weak<Self> = Arc::downgrade(self);
        let interval = interval.max(MIN_SWEEP_INTERVAL);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(service) = service.upgrade() else {
                    break;
                };
                let evicted = service.evict_expired().await;
                if evicted > 0 {
                    tracing::debug!("Evicted {} expired bulk requests", evicted);
                }
            }
        })
    }

    #[cfg(test)]
    async fn expire_now(&self, request_id: Uuid) {
        if let Some(request) = self.requests.write().await.get_mut(&request_id) {
            request.expires_at = Utc::now() - chrono::Duration::seconds(1);
        }
    }
}
