use std::fs::{File, OpenOptions};
use std::future::Future;
use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::pin::Pin;
use std::time::Duration;

use tracing::debug;

use crate::core::error::EngineError;
use crate::core::transfer_engine::{BlockTransfer, TransferStep};
use crate::logging::LogThrottle;

/// Buffer size for positional copies (128KB)
const BUFFER_SIZE: usize = 128 * 1024;

/// In-process positional copy engine.
///
/// Unlike `dd`, a source that ends before `count` units have been read is
/// reported as a failure.
pub struct NativeEngine {
    /// Whether to fsync the destination after each step
    pub sync_files: bool,
}

impl Default for NativeEngine {
    fn default() -> Self {
        Self { sync_files: true }
    }
}

impl BlockTransfer for NativeEngine {
    fn transfer(
        &self,
        step: &TransferStep,
    ) -> Pin<Box<dyn Future<Output = Result<(), EngineError>> + Send>> {
        let step = step.clone();
        let sync_files = self.sync_files;

        Box::pin(async move {
            tokio::task::spawn_blocking(move || copy_range(&step, sync_files)).await?
        })
    }
}

fn io_error(operation: &'static str, path: &Path) -> impl FnOnce(io::Error) -> EngineError {
    let path = path.to_path_buf();
    move |source| EngineError::Io {
        operation,
        path,
        source,
    }
}

fn copy_range(step: &TransferStep, sync_file: bool) -> Result<(), EngineError> {
    let unit = step.unit.size();
    let requested = step.byte_len();

    let mut reader = File::open(&step.source).map_err(io_error("open", &step.source))?;
    reader
        .seek(SeekFrom::Start(step.skip * unit))
        .map_err(io_error("seek", &step.source))?;

    let mut writer = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&step.destination)
        .map_err(io_error("open", &step.destination))?;
    writer
        .seek(SeekFrom::Start(step.seek * unit))
        .map_err(io_error("seek", &step.destination))?;

    let throttle = LogThrottle::new(Duration::from_millis(500));
    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut copied: u64 = 0;

    while copied < requested {
        let want = (requested - copied).min(BUFFER_SIZE as u64) as usize;
        let read = match reader.read(&mut buffer[..want]) {
            Ok(0) => {
                return Err(EngineError::ShortRead {
                    path: step.source.clone(),
                    copied,
                    requested,
                });
            }
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(io_error("read", &step.source)(e)),
        };

        writer
            .write_all(&buffer[..read])
            .map_err(io_error("write", &step.destination))?;
        copied += read as u64;

        if throttle.should_log() {
            debug!(copied, requested, "Block transfer progress");
        }
    }

    writer.flush().map_err(io_error("flush", &step.destination))?;
    if sync_file {
        writer
            .sync_all()
            .map_err(io_error("sync", &step.destination))?;
    }

    Ok(())
}
