use std::path::Path;

use crate::error::RemoteError;
use crate::record::{FileAnnotation, FileRecord};

/// Capabilities the upload routines consume from an authenticated
/// connection to the server.
///
/// [`HttpSession`](crate::HttpSession) is the production implementation;
/// tests substitute their own. Every call blocks until the server responds
/// and nothing is retried.
pub trait Session {
    /// Creates a new file record whose initial content is `content`.
    ///
    /// The server assigns the identifier immediately and makes the bytes
    /// readable at the storage path derived from it.
    fn create_record_from_bytes(
        &self,
        directory: &str,
        name: &str,
        content: &[u8],
        mimetype: &str,
    ) -> Result<FileRecord, RemoteError>;

    /// Fetches a record by identifier.
    fn get_record(&self, id: i64) -> Result<FileRecord, RemoteError>;

    /// Persists a record's mutated metadata (size, hash, hasher).
    fn save_record(&self, record: &FileRecord) -> Result<(), RemoteError>;

    /// Deletes a record.
    fn delete_record(&self, record: &FileRecord) -> Result<(), RemoteError>;

    /// Plain byte-copy upload of a local file.
    fn upload(&self, path: &Path, mimetype: &str) -> Result<FileRecord, RemoteError>;

    /// Wraps a stored file in an annotation under `namespace`.
    fn create_annotation(
        &self,
        file_id: i64,
        namespace: &str,
    ) -> Result<FileAnnotation, RemoteError>;
}
