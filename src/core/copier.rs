//! Resumable block copier.
//!
//! The destination's byte length is the only progress record. Each invocation
//! measures it, then either does nothing, performs one full transfer, or
//! completes a partial block at byte granularity before transferring the
//! remaining whole blocks. Every write lands at the offset matching the
//! already-written length, so the existing prefix is never rewritten.

use std::io::ErrorKind;
use std::path::Path;
use std::time::Instant;

use tracing::{Instrument, info, info_span, warn};

use crate::core::error::CopyError;
use crate::core::models::{CopyJob, CopyOutcome, CopyPhase};
use crate::core::transfer_engine::{BlockTransfer, TransferStep};
use crate::core::verifier::verify_prefix;

pub struct ResumableCopier {
    engine: Box<dyn BlockTransfer>,
    verify: bool,
}

impl ResumableCopier {
    pub fn new(engine: Box<dyn BlockTransfer>) -> Self {
        Self {
            engine,
            verify: false,
        }
    }

    /// Hash-compare source and destination after a copy that transferred data.
    pub fn with_verification(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Bring `job.destination` up to `job.expected_size()` bytes.
    ///
    /// The caller must serialize invocations against the same destination.
    pub async fn copy(&self, job: &CopyJob) -> Result<CopyOutcome, CopyError> {
        let span = info_span!(
            "block_copy",
            label = %job.label,
            source = %job.source.display(),
            destination = %job.destination.display()
        );

        async {
            let start = Instant::now();
            let outcome = self.run(job).await?;

            if self.verify && !outcome.is_noop() {
                let result = verify_prefix(&job.source, &job.destination, job.expected_size())
                    .await
                    .map_err(|e| CopyError::Verification {
                        label: job.label.clone(),
                        reason: e.to_string(),
                    })?;
                info!(bytes_verified = result.bytes_verified, "Verification complete");
            }

            info!(
                outcome = ?outcome,
                duration_secs = start.elapsed().as_secs(),
                "Copy finished"
            );
            Ok(outcome)
        }
        .instrument(span)
        .await
    }

    async fn run(&self, job: &CopyJob) -> Result<CopyOutcome, CopyError> {
        let expected = job.expected_size();
        let existing = destination_len(job).await?;

        if let Some(current) = existing.filter(|len| *len >= expected) {
            if current > expected {
                warn!(
                    current,
                    expected, "Destination is larger than expected, treating as complete"
                );
            }
            info!(phase = "already-complete", current, "Destination already copied");
            return Ok(CopyOutcome::AlreadyComplete {
                existing_bytes: current,
            });
        }

        if !path_exists(&job.source, job).await? {
            return Err(CopyError::InvalidJob {
                label: job.label.clone(),
                reason: format!("source {} does not exist", job.source.display()),
            });
        }

        let Some(mut current) = existing else {
            info!(
                phase = "full",
                blocks = job.block_count,
                block_size = job.block_size,
                "Destination missing, copying all blocks"
            );

            let step = TransferStep::blocks(
                &job.source,
                &job.destination,
                job.block_size,
                job.block_count,
                0,
            );
            self.execute(
                job,
                step,
                CopyPhase::Full {
                    blocks: job.block_count,
                },
            )
            .await?;

            self.ensure_complete(job).await?;
            return Ok(CopyOutcome::Copied {
                blocks: job.block_count,
            });
        };

        let mut aligned_bytes = 0;

        let remainder = current % job.block_size;
        if remainder != 0 {
            let missing = job.block_size - remainder;
            let block = current / job.block_size + 1;
            info!(
                phase = "partial-block",
                block,
                bytes = missing,
                offset = current,
                "Completing partial block"
            );

            let step = TransferStep::bytes(&job.source, &job.destination, missing, current);
            self.execute(job, step, CopyPhase::PartialBlock { block })
                .await?;
            aligned_bytes = missing;

            current = destination_len(job).await?.unwrap_or(0);
        }

        let done_blocks = current / job.block_size;
        let remaining = job.block_count.saturating_sub(done_blocks);
        let mut blocks = 0;

        if remaining > 0 {
            info!(
                phase = "remaining-blocks",
                remaining,
                total = job.block_count,
                offset_blocks = done_blocks,
                "Copying remaining blocks"
            );

            let step = TransferStep::blocks(
                &job.source,
                &job.destination,
                job.block_size,
                remaining,
                done_blocks,
            );
            self.execute(
                job,
                step,
                CopyPhase::RemainingBlocks {
                    remaining,
                    total: job.block_count,
                },
            )
            .await?;
            blocks = remaining;
        }

        self.ensure_complete(job).await?;
        Ok(CopyOutcome::Resumed {
            aligned_bytes,
            blocks,
        })
    }

    async fn execute(
        &self,
        job: &CopyJob,
        step: TransferStep,
        phase: CopyPhase,
    ) -> Result<(), CopyError> {
        self.engine
            .transfer(&step)
            .await
            .map_err(|source| CopyError::Transfer {
                label: job.label.clone(),
                phase,
                source,
            })
    }

    async fn ensure_complete(&self, job: &CopyJob) -> Result<(), CopyError> {
        let expected = job.expected_size();
        let actual = destination_len(job).await?.unwrap_or(0);
        if actual < expected {
            return Err(CopyError::Incomplete {
                label: job.label.clone(),
                expected,
                actual,
            });
        }
        Ok(())
    }
}

/// Current destination length, or `None` if it does not exist.
async fn destination_len(job: &CopyJob) -> Result<Option<u64>, CopyError> {
    match tokio::fs::metadata(&job.destination).await {
        Ok(metadata) => Ok(Some(metadata.len())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(CopyError::Io {
            label: job.label.clone(),
            operation: "stat",
            path: job.destination.clone(),
            source,
        }),
    }
}

async fn path_exists(path: &Path, job: &CopyJob) -> Result<bool, CopyError> {
    tokio::fs::try_exists(path)
        .await
        .map_err(|source| CopyError::Io {
            label: job.label.clone(),
            operation: "stat",
            path: path.to_path_buf(),
            source,
        })
}
