use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use clap::Args;
use stash_client::{Session, register_inplace};
use tracing::debug;

use crate::config::ConnectionArgs;

/// Mimetype recorded when none is supplied and none can be guessed.
const UNKNOWN_MIMETYPE: &str = "type/unknown";

#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Files to upload.
    #[arg(required = true, value_name = "FILE")]
    pub file: Vec<PathBuf>,

    /// Mimetype recorded for every file, overriding extension-based
    /// guessing.
    #[arg(short, long)]
    pub mimetype: Option<String>,

    /// Server data directory. Enables in-place registration via symlink
    /// instead of a byte-copy upload; requires direct write access to the
    /// `Files` directory underneath.
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Wrap each uploaded file in an annotation object.
    #[arg(long)]
    pub wrap: bool,

    /// Namespace for created annotations.
    #[arg(long, requires = "wrap")]
    pub namespace: Option<String>,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

/// Which kind of object the summary line refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    OriginalFile,
    FileAnnotation,
}

impl RecordKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::OriginalFile => "OriginalFile",
            Self::FileAnnotation => "FileAnnotation",
        }
    }
}

/// What a completed upload command produced.
#[derive(Debug)]
pub struct UploadOutcome {
    pub kind: RecordKind,
    pub ids: Vec<i64>,
    /// Identifier of the last uploaded file record, for later reference by
    /// other commands.
    pub last_id: Option<i64>,
}

impl fmt::Display for UploadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), order_and_range_ids(&self.ids))
    }
}

/// Uploads every file in `args`, sequentially and in input order.
///
/// All paths are checked for existence before the first upload starts; a
/// failure mid-batch aborts without rolling back earlier uploads.
pub fn run(session: &dyn Session, args: &UploadArgs) -> Result<UploadOutcome> {
    for file in &args.file {
        if !file.exists() {
            bail!("File: {} does not exist", file.display());
        }
    }

    let kind = if args.wrap {
        RecordKind::FileAnnotation
    } else {
        RecordKind::OriginalFile
    };
    let namespace = args.namespace.as_deref().unwrap_or("");

    let mut ids = Vec::with_capacity(args.file.len());
    let mut last_id = None;
    for file in &args.file {
        let mimetype = resolve_mimetype(args.mimetype.as_deref(), file);
        let record = match &args.data_dir {
            Some(data_dir) => register_inplace(session, file, data_dir, &mimetype)?,
            None => session.upload(file, &mimetype)?,
        };
        debug!("uploaded {} as OriginalFile:{}", file.display(), record.id);
        last_id = Some(record.id);

        if args.wrap {
            let annotation = session.create_annotation(record.id, namespace)?;
            ids.push(annotation.id);
        } else {
            ids.push(record.id);
        }
    }

    Ok(UploadOutcome { kind, ids, last_id })
}

/// Picks the mimetype for a file: the explicit override if given, else a
/// guess from the extension, else the server's unknown sentinel.
fn resolve_mimetype(overridden: Option<&str>, path: &Path) -> String {
    if let Some(mimetype) = overridden {
        return mimetype.to_string();
    }
    mime_guess::from_path(path)
        .first()
        .map(|m| m.to_string())
        .unwrap_or_else(|| UNKNOWN_MIMETYPE.to_string())
}

/// Sorts and range-compresses identifiers: `[5, 6]` becomes `"5-6"` and
/// `[1, 2, 3, 7]` becomes `"1-3,7"`.
fn order_and_range_ids(ids: &[i64]) -> String {
    let mut sorted = ids.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut parts = Vec::new();
    let mut i = 0;
    while i < sorted.len() {
        let start = sorted[i];
        let mut end = start;
        while i + 1 < sorted.len() && sorted[i + 1] == end + 1 {
            i += 1;
            end = sorted[i];
        }
        if start == end {
            parts.push(start.to_string());
        } else {
            parts.push(format!("{start}-{end}"));
        }
        i += 1;
    }
    parts.join(",")
}
