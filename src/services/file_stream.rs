use std::path::PathBuf;

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use futures::TryStreamExt;
use thiserror::Error;
use tokio_util::io::ReaderStream;

use crate::database::{DatabaseError, RecordingRepository};
use crate::services::storage;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("LAN parameter is required.")]
    MissingLan,
    #[error("Video file path not found.")]
    NoFilePath,
    #[error("File not found on storage.")]
    FileMissing,
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// An opened recording, ready to be streamed as an attachment
pub struct FileDownload {
    lan: String,
    name: String,
    size: u64,
    content_type: &'static str,
    file: tokio::fs::File,
}

impl FileDownload {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

/// Resolve a LAN to its recording and open the file for streaming
pub async fn open(repository: &dyn RecordingRepository, lan: &str) -> Result<FileDownload, DownloadError> {
    // Looked up exactly as given; only a blank LAN is rejected outright
    if lan.trim().is_empty() {
        return Err(DownloadError::MissingLan);
    }

    // An unknown LAN and a recording without a path look the same to callers
    let recording = repository.get_by_lan(lan).await?;
    let path = recording
        .as_ref()
        .and_then(|r| r.file_path())
        .ok_or(DownloadError::NoFilePath)?;

    let stored = storage::probe(path).await.ok_or(DownloadError::FileMissing)?;
    let file = tokio::fs::File::open(&stored.path)
        .await
        .map_err(|source| DownloadError::Open {
            path: stored.path.clone(),
            source,
        })?;

    Ok(FileDownload {
        lan: lan.to_string(),
        content_type: storage::content_type_for(&stored.path),
        name: stored.name,
        size: stored.size,
        file,
    })
}

impl IntoResponse for FileDownload {
    fn into_response(self) -> Response {
        let lan = self.lan;
        let stream = ReaderStream::new(self.file).inspect_err(move |e| {
            tracing::error!("Streaming recording for {} failed: {}", lan, e);
        });

        let mut response = Response::new(Body::from_stream(stream));
        *response.status_mut() = StatusCode::OK;
        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(self.content_type));
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(self.size));
        headers.insert(header::CONTENT_DISPOSITION, storage::content_disposition(&self.name));
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{MemoryRecordingRepository, Recording};
    use chrono::{TimeZone, Utc};

    fn recording(lan: &str, status: &str, path: Option<String>) -> Recording {
        Recording {
            id: 1,
            lan: lan.to_string(),
            vkyc_date: Utc.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap(),
            status: status.to_string(),
            call_duration: None,
            nfs_file_path: path,
        }
    }

    #[tokio::test]
    async fn opens_approved_recording() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("LAN1.webm");
        std::fs::write(&path, b"webm-bytes").unwrap();
        let repo = MemoryRecordingRepository::new(vec![recording(
            "LAN1",
            "APPROVED",
            Some(path.to_string_lossy().into_owned()),
        )]);

        // Exact match: surrounding whitespace is part of the key
        assert!(matches!(open(&repo, " LAN1 ").await, Err(DownloadError::NoFilePath)));

        let download = open(&repo, "LAN1").await.unwrap();
        assert_eq!(download.name(), "LAN1.webm");
        assert_eq!(download.size(), 10);

        let response = download.into_response();
        assert_eq!(response.headers()[header::CONTENT_TYPE], "video/webm");
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "10");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"LAN1.webm\""
        );
    }

    #[tokio::test]
    async fn classifies_each_failure() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.mp4").to_string_lossy().into_owned();
        let repo = MemoryRecordingRepository::new(vec![
            recording("PENDING1", "PENDING", Some(missing.clone())),
            recording("NOPATH", "APPROVED", Some("   ".into())),
            recording("GONE", "APPROVED", Some(missing)),
        ]);

        assert!(matches!(open(&repo, "").await, Err(DownloadError::MissingLan)));
        assert!(matches!(open(&repo, "  ").await, Err(DownloadError::MissingLan)));
        assert!(matches!(open(&repo, "UNKNOWN").await, Err(DownloadError::NoFilePath)));
        assert!(matches!(open(&repo, "PENDING1").await, Err(DownloadError::NoFilePath)));
        assert!(matches!(open(&repo, "NOPATH").await, Err(DownloadError::NoFilePath)));
        assert!(matches!(open(&repo, "GONE").await, Err(DownloadError::FileMissing)));
    }
}
