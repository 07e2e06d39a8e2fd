use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use sha1::{Digest, Sha1};

/// Checksum algorithm identifier stored on finalized records.
pub const CHECKSUM_SHA1_160: &str = "SHA1-160";

/// 1 MiB read buffer.
const BUF_SIZE: usize = 1024 * 1024;

/// Computes the byte length and lowercase hex SHA-1 of a file in a single
/// streamed pass, never holding more than one buffer of content in memory.
pub fn size_and_sha1(path: &Path) -> io::Result<(u64, String)> {
    let mut file = File::open(path)?;
    let mut hasher = Sha1::new();
    let mut buf = vec![0u8; BUF_SIZE];
    let mut total: u64 = 0;

    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        total += n as u64;
        hasher.update(&buf[..n]);
    }

    Ok((total, hex::encode(hasher.finalize())))
}
