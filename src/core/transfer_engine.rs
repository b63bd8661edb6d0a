//! Block-transfer primitive used by the resumable copier.
//!
//! A [`TransferStep`] mirrors a single `dd` invocation: a unit size, a count
//! and matching skip/seek offsets expressed in that unit. Engines execute one
//! step at a time and report only success or failure.

pub mod dd;
pub mod native;

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::core::error::EngineError;

pub use dd::DdEngine;
pub use native::NativeEngine;

/// Granularity of a transfer step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferUnit {
    /// Whole blocks of the given size in bytes.
    Blocks(u64),
    /// Single bytes.
    Bytes,
}

impl TransferUnit {
    pub fn size(&self) -> u64 {
        match self {
            Self::Blocks(size) => *size,
            Self::Bytes => 1,
        }
    }
}

/// One transfer: `count` units read from `source` at `skip` units and written
/// to `destination` at `seek` units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferStep {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub unit: TransferUnit,
    pub count: u64,
    pub skip: u64,
    pub seek: u64,
}

impl TransferStep {
    /// Whole-block step reading and writing at the same block offset.
    pub fn blocks(
        source: &Path,
        destination: &Path,
        block_size: u64,
        count: u64,
        offset: u64,
    ) -> Self {
        Self {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            unit: TransferUnit::Blocks(block_size),
            count,
            skip: offset,
            seek: offset,
        }
    }

    /// Byte-granular step reading and writing at the same byte offset.
    pub fn bytes(source: &Path, destination: &Path, count: u64, offset: u64) -> Self {
        Self {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            unit: TransferUnit::Bytes,
            count,
            skip: offset,
            seek: offset,
        }
    }

    /// Total bytes this step moves.
    pub fn byte_len(&self) -> u64 {
        self.unit.size() * self.count
    }
}

pub trait BlockTransfer: Send + Sync {
    fn transfer(
        &self,
        step: &TransferStep,
    ) -> Pin<Box<dyn Future<Output = Result<(), EngineError>> + Send>>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferEngineType {
    /// Shell out to `dd`.
    #[default]
    Dd,
    /// Positional copy inside this process.
    Native,
}

/// Build the engine selected by configuration.
pub fn create_engine(engine_type: TransferEngineType, dd_path: &Path) -> Box<dyn BlockTransfer> {
    match engine_type {
        TransferEngineType::Dd => Box::new(DdEngine::new(dd_path)),
        TransferEngineType::Native => Box::new(NativeEngine::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device() -> &'static Path {
        Path::new("/dev/sr0")
    }

    fn image() -> &'static Path {
        Path::new("out.iso")
    }

    #[test]
    fn test_block_step_uses_block_offsets() {
        let step = TransferStep::blocks(device(), image(), 2048, 26, 74);
        assert_eq!(step.unit, TransferUnit::Blocks(2048));
        assert_eq!(step.skip, 74);
        assert_eq!(step.seek, 74);
        assert_eq!(step.byte_len(), 26 * 2048);
    }

    #[test]
    fn test_byte_step() {
        let step = TransferStep::bytes(device(), image(), 1552, 150_000);
        assert_eq!(step.unit.size(), 1);
        assert_eq!(step.byte_len(), 1552);
        assert_eq!(step.seek, 150_000);
    }

    #[test]
    fn test_engine_type_serializes_lowercase() {
        let json = serde_json::to_string(&TransferEngineType::Native).unwrap();
        assert_eq!(json, "\"native\"");
        let parsed: TransferEngineType = serde_json::from_str("\"dd\"").unwrap();
        assert_eq!(parsed, TransferEngineType::Dd);
    }
}
