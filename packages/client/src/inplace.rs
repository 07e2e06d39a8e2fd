use std::fs;
use std::io;
use std::os::unix::fs::symlink;
use std::path::Path;

use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::error::UploadError;
use crate::hash::{CHECKSUM_SHA1_160, size_and_sha1};
use crate::path::files_path;
use crate::record::FileRecord;
use crate::session::Session;

/// Deletes the placeholder record on drop unless disarmed.
///
/// Cleanup is best effort: a failure here is logged and discarded so that
/// the error which triggered the cleanup stays the one surfaced to the
/// caller.
struct PlaceholderGuard<'a> {
    session: &'a dyn Session,
    record: &'a FileRecord,
    armed: bool,
}

impl<'a> PlaceholderGuard<'a> {
    fn new(session: &'a dyn Session, record: &'a FileRecord) -> Self {
        Self {
            session,
            record,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PlaceholderGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        debug!("attempting to clean up OriginalFile:{}", self.record.id);
        if let Err(e) = self.session.delete_record(self.record) {
            warn!("failed to clean up OriginalFile:{}: {e}", self.record.id);
        }
    }
}

/// Registers `local_path` with the server in place, without copying its
/// bytes.
///
/// Creates a placeholder record, verifies that `data_dir` really is the
/// storage the session writes to by reading the placeholder back from the
/// derived path, then replaces the placeholder file with a symlink to
/// `local_path` and finalizes the record's size and SHA-1 hash.
///
/// Requires write access to the `Files` directory under `data_dir`.
///
/// Fails with [`UploadError::UsageMismatch`] when the read-back check
/// fails and with [`UploadError::Filesystem`] when the placeholder cannot
/// be deleted or the symlink cannot be created; in both cases the
/// placeholder record is deleted remotely, best effort, before the error
/// is returned. If finalization fails after the symlink exists, the record
/// keeps its placeholder-era size and hash while the symlink stays live;
/// no rollback is attempted.
pub fn register_inplace(
    session: &dyn Session,
    local_path: &Path,
    data_dir: &Path,
    mimetype: &str,
) -> Result<FileRecord, UploadError> {
    let abspath = std::path::absolute(local_path).map_err(|source| UploadError::LocalFile {
        path: local_path.to_path_buf(),
        source,
    })?;
    let directory = abspath
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match abspath.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => {
            return Err(UploadError::LocalFile {
                source: io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
                path: abspath,
            });
        }
    };

    debug!("creating placeholder record for {}", abspath.display());
    let placeholder = Uuid::new_v4().to_string();
    let mut record =
        session.create_record_from_bytes(&directory, &name, placeholder.as_bytes(), mimetype)?;

    let guard = PlaceholderGuard::new(session, &record);
    let store_path = files_path(data_dir, record.id);

    // A missing or unreadable placeholder reads as empty, which fails the
    // comparison just like wrong content would.
    let check = fs::read_to_string(&store_path).unwrap_or_default();
    if check != placeholder {
        error!(
            "content check failed, are you on the correct server? OriginalFile:{} {}",
            record.id,
            store_path.display()
        );
        return Err(UploadError::UsageMismatch {
            id: record.id,
            path: store_path,
        });
    }

    debug!("OriginalFile:{} deleting {}", record.id, store_path.display());
    if let Err(source) = fs::remove_file(&store_path) {
        error!(
            "unable to delete file, do you have direct access to the server filesystem? {}",
            store_path.display()
        );
        return Err(UploadError::Filesystem {
            path: store_path,
            source,
        });
    }

    debug!(
        "OriginalFile:{} symlinking {} to {}",
        record.id,
        abspath.display(),
        store_path.display()
    );
    symlink(&abspath, &store_path).map_err(|source| UploadError::Filesystem {
        path: store_path,
        source,
    })?;

    // The symlink is live from here on; a later failure leaves the record's
    // metadata stale rather than rolling it back.
    guard.disarm();

    debug!("OriginalFile:{} computing size and checksum", record.id);
    let (size, hash) = size_and_sha1(&abspath).map_err(|source| UploadError::LocalFile {
        path: abspath.clone(),
        source,
    })?;

    debug!(
        "OriginalFile:{} saving size:{size} and checksum:{hash}",
        record.id
    );
    record.size = size as i64;
    record.hash = Some(hash);
    record.hasher = Some(CHECKSUM_SHA1_160.to_string());
    session.save_record(&record)?;

    Ok(record)
}
