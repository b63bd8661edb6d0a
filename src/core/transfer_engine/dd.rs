use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::core::error::EngineError;
use crate::core::transfer_engine::{BlockTransfer, TransferStep};

/// Runs each step as a `dd` invocation.
pub struct DdEngine {
    program: PathBuf,
}

impl DdEngine {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn tool_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }
}

impl Default for DdEngine {
    fn default() -> Self {
        Self::new("dd")
    }
}

/// Operands for a step. Offsets of zero are omitted; `conv=notrunc` keeps
/// bytes past the seek point intact.
pub fn dd_operands(step: &TransferStep) -> Vec<String> {
    let mut args = vec![
        format!("if={}", step.source.display()),
        format!("of={}", step.destination.display()),
        format!("bs={}", step.unit.size()),
        format!("count={}", step.count),
    ];

    if step.skip > 0 {
        args.push(format!("skip={}", step.skip));
    }
    if step.seek > 0 {
        args.push(format!("seek={}", step.seek));
    }

    args.push("conv=notrunc".to_string());
    args.push("status=none".to_string());
    args
}

impl BlockTransfer for DdEngine {
    fn transfer(
        &self,
        step: &TransferStep,
    ) -> Pin<Box<dyn Future<Output = Result<(), EngineError>> + Send>> {
        let program = self.program.clone();
        let tool = self.tool_name();
        let args = dd_operands(step);

        Box::pin(async move {
            debug!(tool = %tool, args = ?args, "Running block transfer");

            let output = Command::new(&program)
                .args(&args)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::piped())
                .output()
                .await
                .map_err(|source| EngineError::Spawn {
                    tool: tool.clone(),
                    source,
                })?;

            if !output.status.success() {
                return Err(EngineError::Exit {
                    tool,
                    status: output.status.to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                });
            }

            Ok(())
        })
    }
}

/// Returns true if `program` can be spawned.
pub fn is_available(program: &Path) -> bool {
    std::process::Command::new(program)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device() -> &'static Path {
        Path::new("/dev/sr0")
    }

    fn image() -> &'static Path {
        Path::new("disc.iso")
    }

    #[test]
    fn test_full_copy_operands_omit_offsets() {
        let step = TransferStep::blocks(device(), image(), 2048, 100, 0);
        assert_eq!(
            dd_operands(&step),
            vec![
                "if=/dev/sr0",
                "of=disc.iso",
                "bs=2048",
                "count=100",
                "conv=notrunc",
                "status=none"
            ]
        );
    }

    #[test]
    fn test_partial_block_operands() {
        let step = TransferStep::bytes(device(), image(), 1552, 150_000);
        let args = dd_operands(&step);
        assert!(args.contains(&"bs=1".to_string()));
        assert!(args.contains(&"count=1552".to_string()));
        assert!(args.contains(&"skip=150000".to_string()));
        assert!(args.contains(&"seek=150000".to_string()));
    }

    #[test]
    fn test_remaining_blocks_operands() {
        let step = TransferStep::blocks(device(), image(), 2048, 26, 74);
        let args = dd_operands(&step);
        assert!(args.contains(&"bs=2048".to_string()));
        assert!(args.contains(&"count=26".to_string()));
        assert!(args.contains(&"skip=74".to_string()));
        assert!(args.contains(&"seek=74".to_string()));
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let engine = DdEngine::new("/nonexistent/dd_xyz_12345");
        let step = TransferStep::blocks(Path::new("a"), Path::new("b"), 512, 1, 0);
        let err = engine.transfer(&step).await.unwrap_err();
        assert!(matches!(err, EngineError::Spawn { .. }));
    }
}
