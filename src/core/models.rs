use std::fmt;
use std::path::PathBuf;

use super::error::CopyError;

/// A single copy invocation: a fixed number of fixed-size blocks from
/// `source` into `destination`.
///
/// Jobs carry no identity beyond their fields and are rebuilt on every call;
/// resumption state lives entirely in the destination's length on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyJob {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub block_size: u64,
    pub block_count: u64,
    pub label: String,
}

impl CopyJob {
    /// Build a job, rejecting a zero block size or block count.
    pub fn new(
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        block_size: u64,
        block_count: u64,
        label: impl Into<String>,
    ) -> Result<Self, CopyError> {
        let label = label.into();

        if block_size == 0 {
            return Err(CopyError::InvalidJob {
                label,
                reason: "block size must be greater than zero".to_string(),
            });
        }
        if block_count == 0 {
            return Err(CopyError::InvalidJob {
                label,
                reason: "block count must be at least one".to_string(),
            });
        }
        if block_size.checked_mul(block_count).is_none() {
            return Err(CopyError::InvalidJob {
                label,
                reason: format!("{block_count} blocks of {block_size} bytes overflows u64"),
            });
        }

        Ok(Self {
            source: source.into(),
            destination: destination.into(),
            block_size,
            block_count,
            label,
        })
    }

    pub fn expected_size(&self) -> u64 {
        self.block_size * self.block_count
    }
}

/// Which phase of a copy was running, carried by transfer failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyPhase {
    /// Fresh copy into a missing destination.
    Full { blocks: u64 },
    /// Byte-granular completion of a partially written block (1-based index).
    PartialBlock { block: u64 },
    /// Whole-block transfer after the last complete block.
    RemainingBlocks { remaining: u64, total: u64 },
}

impl fmt::Display for CopyPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full { blocks } => write!(f, "full transfer of {blocks} blocks"),
            Self::PartialBlock { block } => write!(f, "completion of partial block {block}"),
            Self::RemainingBlocks { remaining, total } => {
                write!(f, "transfer of remaining {remaining} of {total} blocks")
            }
        }
    }
}

/// What a successful copy invocation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Destination already held at least the expected number of bytes.
    AlreadyComplete { existing_bytes: u64 },
    /// Destination was missing and was written in one transfer.
    Copied { blocks: u64 },
    /// Destination was resumed: `aligned_bytes` completed a partial block,
    /// then `blocks` whole blocks were transferred.
    Resumed { aligned_bytes: u64, blocks: u64 },
}

impl CopyOutcome {
    /// Returns true if no bytes were transferred.
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::AlreadyComplete { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_size() {
        let job = CopyJob::new("/dev/sr0", "/tmp/disc.iso", 2048, 100, "disc").unwrap();
        assert_eq!(job.expected_size(), 204_800);
    }

    #[test]
    fn test_rejects_zero_block_size() {
        let err = CopyJob::new("a", "b", 0, 10, "zero-bs").unwrap_err();
        assert!(matches!(err, CopyError::InvalidJob { .. }));
        assert_eq!(err.label(), "zero-bs");
    }

    #[test]
    fn test_rejects_zero_block_count() {
        let err = CopyJob::new("a", "b", 2048, 0, "zero-count").unwrap_err();
        assert!(err.to_string().contains("block count"));
    }

    #[test]
    fn test_rejects_overflowing_size() {
        let err = CopyJob::new("a", "b", u64::MAX, 2, "huge").unwrap_err();
        assert!(err.to_string().contains("overflows"));
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(
            CopyPhase::RemainingBlocks {
                remaining: 27,
                total: 100
            }
            .to_string(),
            "transfer of remaining 27 of 100 blocks"
        );
        assert_eq!(
            CopyPhase::PartialBlock { block: 74 }.to_string(),
            "completion of partial block 74"
        );
    }
}
