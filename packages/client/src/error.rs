use std::path::PathBuf;

use thiserror::Error;

/// Failures from the remote service itself.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("record not found: {0}")]
    NotFound(i64),

    #[error("server returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures surfaced by the upload routines.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The caller's data directory does not correspond to the storage the
    /// session actually writes to (wrong server, wrong mount, or no shared
    /// filesystem). The placeholder record has already been cleaned up,
    /// best effort, by the time this is returned.
    #[error("content check failed for OriginalFile:{id} at {path}, are you on the correct server?")]
    UsageMismatch { id: i64, path: PathBuf },

    /// The derived storage path resolved correctly but could not be acted
    /// on, typically a permission denial.
    #[error("cannot modify {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading the local input file failed.
    #[error("cannot read {path}: {source}")]
    LocalFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Remote(#[from] RemoteError),
}
