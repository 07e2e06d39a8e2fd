use std::path::{Path, PathBuf};

/// Converts a record identifier to its relative path under the server's
/// `Files` directory.
///
/// Reproduces the server's placement rule, which keeps every directory
/// below 1000 entries: the identifier is repeatedly divided by 1000 and
/// each quotient contributes a `Dir-NNN` segment from its low three decimal
/// digits, most significant group outermost. The file itself is named by
/// the full identifier.
///
/// `1` maps to `1`, `1001` to `Dir-001/1001`, `123456789` to
/// `Dir-123/Dir-456/123456789`.
pub fn long_to_path(id: i64) -> PathBuf {
    let mut segments = Vec::new();
    let mut remaining = id;
    while remaining > 999 {
        remaining /= 1000;
        segments.push(format!("Dir-{:03}", remaining % 1000));
    }

    let mut path = PathBuf::new();
    for segment in segments.iter().rev() {
        path.push(segment);
    }
    path.push(id.to_string());
    path
}

/// Absolute path where the server stores the bytes for `id` under its data
/// directory.
pub fn files_path(data_dir: &Path, id: i64) -> PathBuf {
    data_dir.join("Files").join(long_to_path(id))
}
