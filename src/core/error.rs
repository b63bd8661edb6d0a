use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::models::CopyPhase;

/// Errors raised by a single block-transfer step.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The transfer tool could not be started.
    #[error("failed to spawn {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },
    /// The transfer tool ran but exited unsuccessfully.
    #[error("{tool} exited with {status}: {stderr}")]
    Exit {
        tool: String,
        status: String,
        stderr: String,
    },
    /// In-process I/O failure.
    #[error("failed to {operation} {}: {source}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The source ran out before the requested byte count was copied.
    #[error("source {} ended after {copied} of {requested} bytes", path.display())]
    ShortRead {
        path: PathBuf,
        copied: u64,
        requested: u64,
    },
    /// A blocking worker was cancelled or panicked.
    #[error("transfer worker failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Errors raised by the resumable copier.
#[derive(Debug, Error)]
pub enum CopyError {
    /// The job parameters violate a precondition.
    #[error("invalid copy job '{label}': {reason}")]
    InvalidJob { label: String, reason: String },

    /// A transfer step exited unsuccessfully; the job is aborted.
    #[error("copy '{label}' failed during {phase}")]
    Transfer {
        label: String,
        phase: CopyPhase,
        #[source]
        source: EngineError,
    },

    /// Querying the destination failed for a reason other than absence.
    #[error("copy '{label}': failed to {operation} {}", path.display())]
    Io {
        label: String,
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Every step succeeded but the destination is still short.
    #[error("copy '{label}' incomplete: destination holds {actual} of {expected} bytes")]
    Incomplete {
        label: String,
        expected: u64,
        actual: u64,
    },

    /// Post-copy hash comparison failed.
    #[error("copy '{label}' failed verification: {reason}")]
    Verification { label: String, reason: String },
}

impl CopyError {
    pub fn label(&self) -> &str {
        match self {
            Self::InvalidJob { label, .. }
            | Self::Transfer { label, .. }
            | Self::Io { label, .. }
            | Self::Incomplete { label, .. }
            | Self::Verification { label, .. } => label,
        }
    }
}

/// Errors raised while identifying a disc.
#[derive(Debug, Error)]
pub enum IdentifyError {
    #[error("failed to spawn {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },
    #[error("{tool} exited with {status}: {stderr}")]
    Exit {
        tool: String,
        status: String,
        stderr: String,
    },
    #[error("disc identification output is missing '{0}'")]
    MissingField(&'static str),
}
