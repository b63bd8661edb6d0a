//! End-to-end copies through the real `dd`. Skipped when `dd` is not on PATH.

use std::path::Path;

use bluread::core::transfer_engine::{DdEngine, dd};
use bluread::core::{CopyError, CopyJob, CopyOutcome, EngineError, ResumableCopier};
use tempfile::tempdir;

fn dd_missing() -> bool {
    if dd::is_available(Path::new("dd")) {
        return false;
    }
    eprintln!("dd not available, skipping");
    true
}

#[tokio::test]
async fn test_dd_full_copy() {
    if dd_missing() {
        return;
    }

    let dir = tempdir().unwrap();
    let source = dir.path().join("source.bin");
    let destination = dir.path().join("image.iso");
    let data: Vec<u8> = (0..64 * 512u32).map(|i| (i % 253) as u8).collect();
    std::fs::write(&source, &data).unwrap();

    let job = CopyJob::new(&source, &destination, 512, 64, "dd-full").unwrap();
    let copier = ResumableCopier::new(Box::new(DdEngine::default())).with_verification(true);

    let outcome = copier.copy(&job).await.unwrap();
    assert_eq!(outcome, CopyOutcome::Copied { blocks: 64 });
    assert_eq!(std::fs::read(&destination).unwrap(), data);
}

#[tokio::test]
async fn test_dd_resume_from_partial_block() {
    if dd_missing() {
        return;
    }

    let dir = tempdir().unwrap();
    let source = dir.path().join("source.bin");
    let destination = dir.path().join("image.iso");
    let data: Vec<u8> = (0..100 * 2048u32).map(|i| (i % 251) as u8).collect();
    std::fs::write(&source, &data).unwrap();
    std::fs::write(&destination, &data[..150_000]).unwrap();

    let job = CopyJob::new(&source, &destination, 2048, 100, "dd-resume").unwrap();
    let copier = ResumableCopier::new(Box::new(DdEngine::default()));

    let outcome = copier.copy(&job).await.unwrap();
    assert_eq!(
        outcome,
        CopyOutcome::Resumed {
            aligned_bytes: 1552,
            blocks: 26
        }
    );
    assert_eq!(std::fs::read(&destination).unwrap(), data);
}

#[tokio::test]
async fn test_dd_unreadable_source_fails_with_exit() {
    if dd_missing() {
        return;
    }

    let dir = tempdir().unwrap();
    // A directory exists but cannot be read as a byte stream.
    let source = dir.path().join("not-a-file");
    std::fs::create_dir(&source).unwrap();
    let destination = dir.path().join("image.iso");

    let job = CopyJob::new(&source, &destination, 512, 4, "dd-fail").unwrap();
    let copier = ResumableCopier::new(Box::new(DdEngine::default()));

    let err = copier.copy(&job).await.unwrap_err();
    match err {
        CopyError::Transfer { source, .. } => {
            assert!(matches!(source, EngineError::Exit { .. }));
        }
        other => panic!("expected transfer error, got {other:?}"),
    }
}
