use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Kind of object addressed by a range-checked accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Title,
    Chapter,
    Clip,
    Video,
    Audio,
    Subtitle,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Title => "title",
            Self::Chapter => "chapter",
            Self::Clip => "clip",
            Self::Video => "video stream",
            Self::Audio => "audio stream",
            Self::Subtitle => "subtitle stream",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum DiscError {
    #[error("KEYDB.cfg path '{}' does not exist", .0.display())]
    KeyDbMissing(PathBuf),

    #[error("disc reader unavailable: {0}")]
    BackendUnavailable(String),

    #[error("failed to open device '{}'", .0.display())]
    OpenFailed(PathBuf),

    #[error("failed to get disc info")]
    NoDiscInfo,

    #[error("failed to get titles")]
    NoTitles,

    #[error("failed to get information for title {0}")]
    TitleInfo(u32),

    #[error("{kind} number {requested} is out of range ({available} available)")]
    OutOfRange {
        kind: ItemKind,
        requested: u32,
        available: u32,
    },
}
