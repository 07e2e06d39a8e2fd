use std::fs;
use std::path::Path;

use stash_client::error::{RemoteError, UploadError};
use stash_client::path::files_path;
use stash_client::record::{FileAnnotation, FileRecord};
use stash_client::register_inplace;
use stash_client::session::Session;

use crate::common::{FakeSession, write_file};

/// Wraps a [`FakeSession`] and injects failures into selected calls.
struct FaultySession<'a> {
    inner: &'a FakeSession,
    fail_delete: bool,
    fail_save: bool,
}

impl FaultySession<'_> {
    fn server_error() -> RemoteError {
        RemoteError::Api {
            status: 500,
            message: "injected failure".into(),
        }
    }
}

impl Session for FaultySession<'_> {
    fn create_record_from_bytes(
        &self,
        directory: &str,
        name: &str,
        content: &[u8],
        mimetype: &str,
    ) -> Result<FileRecord, RemoteError> {
        self.inner
            .create_record_from_bytes(directory, name, content, mimetype)
    }

    fn get_record(&self, id: i64) -> Result<FileRecord, RemoteError> {
        self.inner.get_record(id)
    }

    fn save_record(&self, record: &FileRecord) -> Result<(), RemoteError> {
        if self.fail_save {
            return Err(Self::server_error());
        }
        self.inner.save_record(record)
    }

    fn delete_record(&self, record: &FileRecord) -> Result<(), RemoteError> {
        if self.fail_delete {
            return Err(Self::server_error());
        }
        self.inner.delete_record(record)
    }

    fn upload(&self, path: &Path, mimetype: &str) -> Result<FileRecord, RemoteError> {
        self.inner.upload(path, mimetype)
    }

    fn create_annotation(
        &self,
        file_id: i64,
        namespace: &str,
    ) -> Result<FileAnnotation, RemoteError> {
        self.inner.create_annotation(file_id, namespace)
    }
}

mod successful_registration {
    use super::*;

    #[test]
    fn record_carries_real_size_and_hash() {
        let data_dir = tempfile::tempdir().unwrap();
        let source_dir = tempfile::tempdir().unwrap();
        let session = FakeSession::new(data_dir.path());
        let source = write_file(source_dir.path(), "greeting.txt", b"hello\n");

        let record = register_inplace(&session, &source, data_dir.path(), "text/plain").unwrap();

        assert_eq!(record.size, 6);
        assert_eq!(
            record.hash.as_deref(),
            Some("f572d396fae9206628714fb2ce00f72e94f2258f")
        );
        assert_eq!(record.hasher.as_deref(), Some("SHA1-160"));
        assert_eq!(record.mimetype, "text/plain");
    }

    #[test]
    fn storage_path_is_a_symlink_to_the_source() {
        let data_dir = tempfile::tempdir().unwrap();
        let source_dir = tempfile::tempdir().unwrap();
        let session = FakeSession::new(data_dir.path());
        let source = write_file(source_dir.path(), "linked.bin", b"payload");

        let record = register_inplace(&session, &source, data_dir.path(), "").unwrap();

        let store_path = files_path(data_dir.path(), record.id);
        let metadata = fs::symlink_metadata(&store_path).unwrap();
        assert!(metadata.file_type().is_symlink());

        let target = fs::read_link(&store_path).unwrap();
        assert_eq!(target, std::path::absolute(&source).unwrap());
        assert_eq!(fs::read(&store_path).unwrap(), b"payload");
    }

    #[test]
    fn saved_metadata_is_visible_through_the_session() {
        let data_dir = tempfile::tempdir().unwrap();
        let source_dir = tempfile::tempdir().unwrap();
        let session = FakeSession::new(data_dir.path());
        let source = write_file(source_dir.path(), "visible.txt", b"hello\n");

        let record = register_inplace(&session, &source, data_dir.path(), "text/plain").unwrap();

        let fetched = session.get_record(record.id).unwrap();
        assert_eq!(fetched, record);
    }

    #[test]
    fn record_keeps_the_source_base_name() {
        let data_dir = tempfile::tempdir().unwrap();
        let source_dir = tempfile::tempdir().unwrap();
        let session = FakeSession::new(data_dir.path());
        let source = write_file(source_dir.path(), "named.csv", b"a,b\n");

        let record = register_inplace(&session, &source, data_dir.path(), "text/csv").unwrap();

        assert_eq!(record.name, "named.csv");
        assert_eq!(
            record.directory,
            std::path::absolute(source_dir.path())
                .unwrap()
                .to_string_lossy()
        );
    }

    #[test]
    fn relative_paths_are_resolved_before_registration() {
        let data_dir = tempfile::tempdir().unwrap();
        let session = FakeSession::new(data_dir.path());
        let source_dir = tempfile::tempdir().unwrap();
        write_file(source_dir.path(), "relative.txt", b"hello\n");

        let prev = std::env::current_dir().unwrap();
        std::env::set_current_dir(source_dir.path()).unwrap();
        let result = register_inplace(
            &session,
            Path::new("relative.txt"),
            data_dir.path(),
            "text/plain",
        );
        std::env::set_current_dir(prev).unwrap();

        let record = result.unwrap();
        let target = fs::read_link(files_path(data_dir.path(), record.id)).unwrap();
        assert!(target.is_absolute());
        assert_eq!(target.file_name().unwrap(), "relative.txt");
    }
}

mod data_dir_mismatch {
    use super::*;

    #[test]
    fn wrong_data_dir_fails_with_usage_mismatch() {
        let data_dir = tempfile::tempdir().unwrap();
        let wrong_dir = tempfile::tempdir().unwrap();
        let source_dir = tempfile::tempdir().unwrap();
        let session = FakeSession::new(data_dir.path());
        let source = write_file(source_dir.path(), "stranded.txt", b"hello\n");

        let err = register_inplace(&session, &source, wrong_dir.path(), "text/plain").unwrap_err();

        match err {
            UploadError::UsageMismatch { id, path } => {
                assert_eq!(id, 1);
                assert!(path.starts_with(wrong_dir.path()));
            }
            other => panic!("expected UsageMismatch, got {other:?}"),
        }
    }

    #[test]
    fn placeholder_record_is_deleted_after_mismatch() {
        let data_dir = tempfile::tempdir().unwrap();
        let wrong_dir = tempfile::tempdir().unwrap();
        let source_dir = tempfile::tempdir().unwrap();
        let session = FakeSession::new(data_dir.path());
        let source = write_file(source_dir.path(), "cleaned.txt", b"hello\n");

        let err = register_inplace(&session, &source, wrong_dir.path(), "text/plain").unwrap_err();

        let UploadError::UsageMismatch { id, .. } = err else {
            panic!("expected UsageMismatch, got {err:?}");
        };
        assert!(matches!(
            session.get_record(id),
            Err(RemoteError::NotFound(_))
        ));
    }

    #[test]
    fn failed_cleanup_does_not_mask_the_mismatch() {
        let data_dir = tempfile::tempdir().unwrap();
        let wrong_dir = tempfile::tempdir().unwrap();
        let source_dir = tempfile::tempdir().unwrap();
        let inner = FakeSession::new(data_dir.path());
        let session = FaultySession {
            inner: &inner,
            fail_delete: true,
            fail_save: false,
        };
        let source = write_file(source_dir.path(), "sticky.txt", b"hello\n");

        let err = register_inplace(&session, &source, wrong_dir.path(), "text/plain").unwrap_err();

        // The primary error survives; the record is left behind because the
        // cleanup attempt failed.
        assert!(matches!(err, UploadError::UsageMismatch { .. }));
        assert!(inner.get_record(1).is_ok());
    }

    #[test]
    fn source_file_is_untouched_after_mismatch() {
        let data_dir = tempfile::tempdir().unwrap();
        let wrong_dir = tempfile::tempdir().unwrap();
        let source_dir = tempfile::tempdir().unwrap();
        let session = FakeSession::new(data_dir.path());
        let source = write_file(source_dir.path(), "kept.txt", b"hello\n");

        let _ = register_inplace(&session, &source, wrong_dir.path(), "text/plain").unwrap_err();

        assert_eq!(fs::read(&source).unwrap(), b"hello\n");
    }
}

mod finalization_failure {
    use super::*;

    #[test]
    fn save_failure_leaves_the_symlink_and_record_in_place() {
        let data_dir = tempfile::tempdir().unwrap();
        let source_dir = tempfile::tempdir().unwrap();
        let inner = FakeSession::new(data_dir.path());
        let session = FaultySession {
            inner: &inner,
            fail_delete: false,
            fail_save: true,
        };
        let source = write_file(source_dir.path(), "stale.txt", b"hello\n");

        let err = register_inplace(&session, &source, data_dir.path(), "text/plain").unwrap_err();
        assert!(matches!(err, UploadError::Remote(_)));

        // Known inconsistency window: the symlink exists but the record
        // still carries its placeholder-era metadata.
        let store_path = files_path(data_dir.path(), 1);
        assert!(fs::symlink_metadata(&store_path).unwrap().file_type().is_symlink());
        let record = inner.get_record(1).unwrap();
        assert_eq!(record.hash, None);
    }
}
