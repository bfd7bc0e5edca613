//! Streaming ZIP assembly for bulk downloads.
//!
//! A blocking-pool producer writes the archive into [`ChunkWriter`], which
//! hands 64 KiB chunks to a bounded channel. The response body drains the
//! channel, so at most `CHANNEL_DEPTH` chunks are ever held in memory and a
//! slow client slows the producer down. When the client goes away the
//! receiver is dropped, the next send fails and the producer unwinds,
//! closing its files.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use axum::body::Bytes;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::storage::StoredFile;

const CHUNK_SIZE: usize = 64 * 1024;
const CHANNEL_DEPTH: usize = 8;
const COMPRESSION_LEVEL: i64 = 9;
const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

pub type ArchiveStream = ReceiverStream<io::Result<Bytes>>;

/// One file queued for the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub lan: String,
    pub path: PathBuf,
    /// Name inside the archive: `<lan>_<basename>`
    pub name: String,
    pub size: u64,
}

impl ArchiveEntry {
    pub fn new(lan: &str, file: StoredFile) -> Self {
        Self {
            lan: lan.to_string(),
            name: format!("{}_{}", lan, file.name),
            path: file.path,
            size: file.size,
        }
    }
}

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("client disconnected")]
    Disconnected,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

pub fn archive_filename(request_id: Uuid) -> String {
    format!("vkyc_recordings_bulk_{}.zip", request_id)
}

/// Start producing the archive and return the byte stream for the response
/// body. Must be called from within a Tokio runtime.
pub fn stream_archive(request_id: Uuid, entries: Vec<ArchiveEntry>) -> ArchiveStream {
    spawn_producer(request_id, entries).0
}

/// Producer task plus its stream. The task resolves to the number of files
/// archived, or the error that stopped it.
fn spawn_producer(
    request_id: Uuid,
    entries: Vec<ArchiveEntry>,
) -> (ArchiveStream, JoinHandle<Result<usize, StreamError>>) {
    let (tx, rx) = mpsc::channel(CHANNEL_DEPTH);
    let failures = tx.clone();

    let producer = tokio::task::spawn_blocking(move || {
        let result = write_archive(&entries, ChunkWriter::new(tx));
        match &result {
            Ok(written) => {
                tracing::info!("Bulk archive {} complete: {} of {} files", request_id, written, entries.len());
            }
            Err(_) if failures.is_closed() => {
                tracing::debug!("Bulk archive {} abandoned: client disconnected", request_id);
            }
            Err(e) => {
                tracing::error!("Bulk archive {} failed mid-stream: {}", request_id, e);
                // Ends the body with an error so the connection is aborted
                // rather than closed as if the archive were complete.
                let _ = failures.blocking_send(Err(io::Error::new(io::ErrorKind::Other, e.to_string())));
            }
        }
        result
    });

    (ReceiverStream::new(rx), producer)
}

/// Write every entry, in order, into a streaming ZIP. Returns how many files
/// made it into the archive.
fn write_archive<W: Write>(entries: &[ArchiveEntry], sink: W) -> Result<usize, StreamError> {
    let mut zip = ZipWriter::new_stream(sink);
    let mut written = 0;

    for entry in entries {
        // The file was probed during resolution but may have vanished since.
        let mut file = match File::open(&entry.path) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!("Skipping {} ({}): {}", entry.lan, entry.path.display(), e);
                continue;
            }
        };

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(COMPRESSION_LEVEL))
            .large_file(entry.size >= ZIP64_THRESHOLD);

        zip.start_file(entry.name.as_str(), options)?;
        io::copy(&mut file, &mut zip)?;
        written += 1;
    }

    zip.finish()?;
    Ok(written)
}

/// `Write` adapter that forwards fixed-size chunks into the body channel.
/// Only usable off the async executor since sends block.
struct ChunkWriter {
    tx: mpsc::Sender<io::Result<Bytes>>,
    buf: Vec<u8>,
}

impl ChunkWriter {
    fn new(tx: mpsc::Sender<io::Result<Bytes>>) -> Self {
        Self {
            tx,
            buf: Vec::with_capacity(CHUNK_SIZE),
        }
    }

    fn send_buffered(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let chunk = Bytes::from(std::mem::replace(&mut self.buf, Vec::with_capacity(CHUNK_SIZE)));
        self.tx
            .blocking_send(Ok(chunk))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, StreamError::Disconnected))
    }
}

impl Write for ChunkWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        if self.buf.len() >= CHUNK_SIZE {
            self.send_buffered()?;
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.send_buffered()
    }
}

impl Drop for ChunkWriter {
    fn drop(&mut self) {
        let _ = self.send_buffered();
    }
}
