pub mod archive;
pub mod bulk_service;
pub mod file_stream;
pub mod storage;

pub use bulk_service::{BulkError, BulkRequest, BulkRequestService, ResolvedBatch};
pub use file_stream::{DownloadError, FileDownload};
