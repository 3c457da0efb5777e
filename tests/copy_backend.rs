// tests/copy_backend.rs
//
// Запуск только этого файла:
//   cargo test --test copy_backend -- --nocapture
//
// Покрываем бэкенды на уровне трейта VersionBackend:
// 1) CopyBackend: snapshot/list/restore roundtrip, монотонные stamps,
//    increment_sizes, remove_older_than не трогает новейший кадр.
// 2) RdiffBackend с несуществующим бинарём — BackendUnavailable.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;

use verfs::{CopyBackend, RdiffBackend, SnapshotOptions, VerfsError, VersionBackend};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("verfstest-backend-{prefix}-{pid}-{t}-{id}"))
}

fn opts(root: &Path, time: Option<i64>) -> SnapshotOptions {
    SnapshotOptions {
        tmp_dir: root.join("tmp"),
        current_time: time,
    }
}

fn stage(root: &Path, data: &[u8]) -> Result<PathBuf> {
    let dir = root.join("stage");
    fs::create_dir_all(&dir)?;
    fs::write(dir.join("datafile"), data)?;
    Ok(dir)
}

#[test]
fn copy_roundtrip_and_sizes() -> Result<()> {
    let root = unique_root("roundtrip");
    fs::create_dir_all(&root)?;
    let backend = CopyBackend::new();
    let repo = root.join("repo");

    for (i, data) in [b"one".as_ref(), b"two two", b"three three three"]
        .iter()
        .enumerate()
    {
        let st = stage(&root, data)?;
        backend.snapshot(&st, &repo, &opts(&root, Some(100 + i as i64)))?;
    }

    let stamps = backend.list_versions(&repo)?;
    assert_eq!(stamps, vec![100, 101, 102]);

    let out = root.join("restore");
    let restored = backend.restore(&repo, 101, &out)?;
    assert_eq!(fs::read(&restored)?, b"two two");

    let sizes = backend.increment_sizes(&repo)?;
    assert_eq!(sizes.len(), 3);
    assert!(sizes[0].ends_with(" B"));
    Ok(())
}

#[test]
fn copy_stamps_stay_monotonic() -> Result<()> {
    let root = unique_root("monotonic");
    fs::create_dir_all(&root)?;
    let backend = CopyBackend::new();
    let repo = root.join("repo");

    // два снапшота с одинаковым forced time — второй получает stamp+1
    let st = stage(&root, b"a")?;
    backend.snapshot(&st, &repo, &opts(&root, Some(500)))?;
    let st = stage(&root, b"b")?;
    backend.snapshot(&st, &repo, &opts(&root, Some(500)))?;

    assert_eq!(backend.list_versions(&repo)?, vec![500, 501]);
    Ok(())
}

#[test]
fn copy_prune_keeps_newest() -> Result<()> {
    let root = unique_root("prune");
    fs::create_dir_all(&root)?;
    let backend = CopyBackend::new();
    let repo = root.join("repo");

    for t in [10i64, 20, 30] {
        let st = stage(&root, format!("data-{t}").as_bytes())?;
        backend.snapshot(&st, &repo, &opts(&root, Some(t)))?;
    }

    // отсечка за горизонтом: новейший кадр всё равно остаётся
    backend.remove_older_than(&repo, "1000", &opts(&root, None))?;
    assert_eq!(backend.list_versions(&repo)?, vec![30]);
    Ok(())
}

#[test]
fn copy_missing_repo_is_empty_history() -> Result<()> {
    let root = unique_root("empty");
    fs::create_dir_all(&root)?;
    let backend = CopyBackend::new();

    assert!(backend.list_versions(&root.join("nope"))?.is_empty());
    assert!(backend.increment_sizes(&root.join("nope"))?.is_empty());
    Ok(())
}

#[test]
fn copy_restore_of_unknown_stamp_is_backend_error() -> Result<()> {
    let root = unique_root("badstamp");
    fs::create_dir_all(&root)?;
    let backend = CopyBackend::new();
    let repo = root.join("repo");

    let st = stage(&root, b"a")?;
    backend.snapshot(&st, &repo, &opts(&root, Some(1)))?;

    let err = backend.restore(&repo, 999, &root.join("out")).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<VerfsError>(),
        Some(VerfsError::Backend(_))
    ));
    Ok(())
}

#[test]
fn rdiff_missing_binary_is_backend_unavailable() -> Result<()> {
    let root = unique_root("nordiff");
    fs::create_dir_all(root.join("repo/rdiff-backup-data"))?;
    let backend = RdiffBackend::new("definitely-not-rdiff-backup-bin");

    let err = backend.list_versions(&root.join("repo")).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<VerfsError>(),
        Some(VerfsError::BackendUnavailable(_))
    ));

    let st = stage(&root, b"a")?;
    let err = backend
        .snapshot(&st, &root.join("repo"), &opts(&root, None))
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<VerfsError>(),
        Some(VerfsError::BackendUnavailable(_))
    ));
    Ok(())
}
