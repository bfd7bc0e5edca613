use std::path::{Path, PathBuf};

use axum::http::HeaderValue;

/// A media file confirmed present on the share
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub path: PathBuf,
    /// Base name of `path`
    pub name: String,
    pub size: u64,
}

/// Check that `path` names a regular file. Anything else (missing, a
/// directory, permission denied, share unmounted) counts as inaccessible.
pub async fn probe(path: impl AsRef<Path>) -> Option<StoredFile> {
    let path = path.as_ref();
    let name = path.file_name()?.to_string_lossy().into_owned();

    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Some(StoredFile {
            path: path.to_path_buf(),
            name,
            size: meta.len(),
        }),
        Ok(_) => {
            tracing::debug!("Not a regular file: {}", path.display());
            None
        }
        Err(e) => {
            tracing::debug!("File not accessible: {}: {}", path.display(), e);
            None
        }
    }
}

pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("mp4") | Some("m4v") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mov") => "video/quicktime",
        Some("mkv") => "video/x-matroska",
        Some("avi") => "video/x-msvideo",
        _ => "application/octet-stream",
    }
}

/// `attachment; filename="..."` with characters that would break the
/// quoted-string replaced
pub fn content_disposition(filename: &str) -> HeaderValue {
    let safe: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_control() || !c.is_ascii() => '_',
            c => c,
        })
        .collect();
    HeaderValue::from_str(&format!("attachment; filename=\"{}\"", safe))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}
