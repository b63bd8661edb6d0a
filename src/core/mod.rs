pub mod copier;
pub mod error;
pub mod identify;
pub mod models;
pub mod transfer_engine;
pub mod verifier;

pub use copier::ResumableCopier;
pub use error::{CopyError, EngineError, IdentifyError};
pub use identify::{DiscIdentifier, DiscIdentity};
pub use models::{CopyJob, CopyOutcome, CopyPhase};
pub use transfer_engine::{BlockTransfer, TransferEngineType, TransferStep, TransferUnit};
pub use verifier::{VerifyResult, verify_prefix};
