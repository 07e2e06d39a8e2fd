use serde::{Deserialize, Serialize};

/// Server-side metadata entity for a stored file.
///
/// The server assigns `id` at creation time, before real content exists.
/// `hash` and `hasher` stay unset until an upload finalizes the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: i64,

    /// Directory component of the original path, as reported by the client.
    pub directory: String,

    /// Base name of the file.
    pub name: String,

    /// Declared size in bytes.
    pub size: i64,

    pub mimetype: String,

    /// Lowercase hex content hash.
    #[serde(default)]
    pub hash: Option<String>,

    /// Checksum algorithm identifier, e.g. `SHA1-160`.
    #[serde(default)]
    pub hasher: Option<String>,
}

/// Annotation object wrapping a stored file under a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAnnotation {
    pub id: i64,

    /// Identifier of the wrapped [`FileRecord`].
    pub file_id: i64,

    /// Namespace the annotation is filed under. Empty if none was given.
    #[serde(default)]
    pub namespace: String,
}
