use anyhow::{Result, anyhow, bail};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use tracing::{debug, info};

/// Buffer size for hashing reads (128KB)
const BUFFER_SIZE: usize = 128 * 1024;

/// Result of a successful verification
#[derive(Debug)]
pub struct VerifyResult {
    pub bytes_verified: u64,
}

/// Reason a copy failed verification
#[derive(Debug, PartialEq, Eq)]
pub enum MismatchReason {
    /// BLAKE3 hash of source and destination prefixes differ
    HashMismatch,
    /// One side ended before the expected length
    ShortRead { path: String, read: u64 },
}

/// Verify that the first `len` bytes of `source` and `destination` are identical.
///
/// Both sides are hashed with BLAKE3 on a blocking worker. Bytes in the
/// destination past `len` are not considered.
pub async fn verify_prefix(source: &Path, destination: &Path, len: u64) -> Result<VerifyResult> {
    info!(
        source = %source.display(),
        destination = %destination.display(),
        bytes = len,
        "Starting hash verification"
    );

    let source = source.to_path_buf();
    let destination = destination.to_path_buf();

    tokio::task::spawn_blocking(move || {
        let source_hash = hash_prefix_sync(&source, len)?;
        let dest_hash = hash_prefix_sync(&destination, len)?;

        let mismatch = match (source_hash, dest_hash) {
            (Ok(a), Ok(b)) if a == b => None,
            (Ok(_), Ok(_)) => Some(MismatchReason::HashMismatch),
            (Err(reason), _) | (_, Err(reason)) => Some(reason),
        };

        if let Some(reason) = mismatch {
            bail!(format_mismatch_error(&reason, len));
        }

        debug!(bytes_verified = len, "Hashes match");
        Ok(VerifyResult {
            bytes_verified: len,
        })
    })
    .await?
}

/// Hash the first `len` bytes of a file. The inner `Err` is a short file,
/// the outer one an I/O failure.
fn hash_prefix_sync(path: &Path, len: u64) -> Result<Result<blake3::Hash, MismatchReason>> {
    let mut file =
        File::open(path).map_err(|e| anyhow!("Failed to open {}: {}", path.display(), e))?;

    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut read_total: u64 = 0;

    while read_total < len {
        let want = (len - read_total).min(BUFFER_SIZE as u64) as usize;
        let bytes_read = match file.read(&mut buffer[..want]) {
            Ok(0) => {
                return Ok(Err(MismatchReason::ShortRead {
                    path: path.display().to_string(),
                    read: read_total,
                }));
            }
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(anyhow!("Failed to read {}: {}", path.display(), e)),
        };
        hasher.update(&buffer[..bytes_read]);
        read_total += bytes_read as u64;
    }

    Ok(Ok(hasher.finalize()))
}

fn format_mismatch_error(reason: &MismatchReason, len: u64) -> String {
    match reason {
        MismatchReason::HashMismatch => {
            format!("Verification failed: hash mismatch over {} bytes", len)
        }
        MismatchReason::ShortRead { path, read } => format!(
            "Verification failed: {} ended after {} of {} bytes",
            path, read, len
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_verify_prefix_success() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("source.img");
        let dest = temp.path().join("dest.iso");

        std::fs::write(&source, vec![0xAB; 10 * 1024]).unwrap();
        std::fs::write(&dest, vec![0xAB; 10 * 1024]).unwrap();

        let result = verify_prefix(&source, &dest, 10 * 1024).await.unwrap();
        assert_eq!(result.bytes_verified, 10 * 1024);
    }

    #[tokio::test]
    async fn test_verify_prefix_ignores_trailing_bytes() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("source.img");
        let dest = temp.path().join("dest.iso");

        std::fs::write(&source, b"hello world, and more").unwrap();
        std::fs::write(&dest, b"hello world").unwrap();

        assert!(verify_prefix(&source, &dest, 11).await.is_ok());
    }

    #[tokio::test]
    async fn test_verify_prefix_mismatch() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("source.img");
        let dest = temp.path().join("dest.iso");

        std::fs::write(&source, b"original content").unwrap();
        std::fs::write(&dest, b"corrupted content").unwrap();

        let err = verify_prefix(&source, &dest, 16).await.unwrap_err().to_string();
        assert!(err.contains("hash mismatch"));
    }

    #[tokio::test]
    async fn test_verify_prefix_short_destination() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("source.img");
        let dest = temp.path().join("dest.iso");

        std::fs::write(&source, vec![1u8; 100]).unwrap();
        std::fs::write(&dest, vec![1u8; 40]).unwrap();

        let err = verify_prefix(&source, &dest, 100).await.unwrap_err().to_string();
        assert!(err.contains("ended after 40 of 100 bytes"));
    }

    #[tokio::test]
    async fn test_verify_prefix_missing_file() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("source.img");
        std::fs::write(&source, b"data").unwrap();

        let result = verify_prefix(&source, &temp.path().join("missing.iso"), 4).await;
        assert!(result.unwrap_err().to_string().contains("Failed to open"));
    }
}
