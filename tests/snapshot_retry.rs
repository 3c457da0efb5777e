// tests/snapshot_retry.rs
//
// Запуск только этого файла:
//   cargo test --test snapshot_retry -- --nocapture
//
// Покрываем ретраи снапшота на close через бэкенд, который отказывает
// заданное число раз (open_with_backend позволяет подставить свой):
// 1) Отказы в пределах max_tries — close() успешен, версия записана,
//    счётчик ретраев растёт.
// 2) Отказы сверх max_tries — close() возвращает ошибку, истории нет,
//    счётчик фейлов растёт.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Result};

use verfs::{
    metrics, BackendKind, CopyBackend, OpenMode, SnapshotOptions, VerfsBuilder, VersionBackend,
    VersioningFs,
};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("verfstest-retry-{prefix}-{pid}-{t}-{id}"))
}

/// CopyBackend, у которого первые `failures_left` снапшотов отказывают.
struct FlakyBackend {
    inner: CopyBackend,
    failures_left: AtomicU32,
}

impl FlakyBackend {
    fn new(failures: u32) -> Self {
        Self {
            inner: CopyBackend::new(),
            failures_left: AtomicU32::new(failures),
        }
    }
}

impl VersionBackend for FlakyBackend {
    fn tool_name(&self) -> &str {
        "flaky-copy"
    }

    fn snapshot(&self, src_dir: &Path, snap_dir: &Path, opts: &SnapshotOptions) -> Result<()> {
        let left = self.failures_left.load(Ordering::Relaxed);
        if left > 0 {
            self.failures_left.store(left - 1, Ordering::Relaxed);
            return Err(anyhow!("induced snapshot failure ({left} left)"));
        }
        self.inner.snapshot(src_dir, snap_dir, opts)
    }

    fn list_versions(&self, snap_dir: &Path) -> Result<Vec<i64>> {
        self.inner.list_versions(snap_dir)
    }

    fn restore(&self, snap_dir: &Path, stamp: i64, dest_dir: &Path) -> Result<PathBuf> {
        self.inner.restore(snap_dir, stamp, dest_dir)
    }

    fn increment_sizes(&self, snap_dir: &Path) -> Result<Vec<String>> {
        self.inner.increment_sizes(snap_dir)
    }

    fn remove_older_than(
        &self,
        snap_dir: &Path,
        cutoff: &str,
        opts: &SnapshotOptions,
    ) -> Result<()> {
        self.inner.remove_older_than(snap_dir, cutoff, opts)
    }
}

fn flaky_fs(root: &Path, failures: u32, max_tries: u32) -> Result<VersioningFs> {
    let cfg = VerfsBuilder::from_default()
        .backend(BackendKind::Copy)
        .test_clock(Some(5_000))
        .snapshot_max_tries(max_tries)
        .snapshot_retry_ms(1)
        .build();
    VersioningFs::open_with_backend(root, cfg, Box::new(FlakyBackend::new(failures)))
}

#[test]
fn close_retries_until_snapshot_lands() -> Result<()> {
    let root = unique_root("lands");
    // два отказа при трёх попытках: третья должна пройти
    let fs = flaky_fs(&root, 2, 3)?;

    let before = metrics::snapshot();
    let mut f = fs.open("file.txt", OpenMode::Write, None)?;
    f.write_all(b"v1")?;
    f.close()?;
    let after = metrics::snapshot();

    assert_eq!(fs.version("file.txt")?, 1);
    assert!(after.snapshot_retries >= before.snapshot_retries + 2);
    Ok(())
}

#[test]
fn close_surfaces_exhausted_retries() -> Result<()> {
    let root = unique_root("exhausted");
    // отказов больше, чем попыток
    let fs = flaky_fs(&root, 10, 2)?;

    let before = metrics::snapshot();
    let mut f = fs.open("file.txt", OpenMode::Write, None)?;
    f.write_all(b"v1")?;
    let err = f.close().unwrap_err();
    let after = metrics::snapshot();

    assert!(
        format!("{:#}", err).contains("induced snapshot failure"),
        "close must return the backend error, got {:#}",
        err
    );
    assert_eq!(fs.version("file.txt")?, 0, "no history after failed snapshot");
    assert!(after.snapshot_failures >= before.snapshot_failures + 1);
    assert!(after.snapshot_retries >= before.snapshot_retries + 1);

    // повторный close идемпотентен и не пытается снова
    f.close()?;

    // staging не утёк
    let leftovers = std::fs::read_dir(fs.tmp_dir())?.count();
    assert_eq!(leftovers, 0);
    Ok(())
}
