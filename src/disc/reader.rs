use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::{Disc, DiscError};

/// Which titles libbluray should report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TitleFilter {
    /// Every playlist on the disc.
    #[default]
    All,
    /// Drop playlists that duplicate another title.
    UniqueTitles,
    /// Drop playlists that reuse the same clips.
    UniqueClips,
    /// Both duplicate filters.
    Relevant,
}

impl TitleFilter {
    /// Flag value passed to `bd_get_titles`.
    pub fn flags(&self) -> u8 {
        match self {
            Self::All => 0x00,
            Self::UniqueTitles => 0x01,
            Self::UniqueClips => 0x02,
            Self::Relevant => 0x03,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReadRequest {
    pub device: PathBuf,
    pub keydb: Option<PathBuf>,
    pub title_filter: TitleFilter,
    /// Titles shorter than this many seconds are skipped.
    pub min_title_length: u32,
}

impl ReadRequest {
    pub fn new(device: impl Into<PathBuf>) -> Self {
        Self {
            device: device.into(),
            keydb: None,
            title_filter: TitleFilter::All,
            min_title_length: 0,
        }
    }

    pub fn with_keydb(mut self, keydb: Option<PathBuf>) -> Self {
        self.keydb = keydb;
        self
    }

    /// Fails if a KEYDB path was given but does not exist.
    pub fn validate(&self) -> Result<(), DiscError> {
        match &self.keydb {
            Some(path) if !path.exists() => Err(DiscError::KeyDbMissing(path.clone())),
            _ => Ok(()),
        }
    }
}

/// Source of disc metadata.
///
/// NOTE: Implementations may block on device I/O; call from a blocking
/// context (e.g., via spawn_blocking).
pub trait DiscReader: Send + Sync {
    fn read(&self, request: &ReadRequest) -> Result<Disc, DiscError>;
}
