//! File-based locking over the backup area.
//!
//! Cross-platform (fs2) advisory locks:
//! - Exclusive: snapshot/prune — rdiff-backup repositories must not be
//!   mutated concurrently (оно само не переживает два одновременных
//!   запуска по одному каталогу).
//! - Shared: list/restore — readers coexist, but never overlap a writer.
//!
//! Lock file path: <backup_dir>/LOCK
//! Lock is released on Drop.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy)]
pub enum LockMode {
    Shared,
    Exclusive,
}

pub struct LockGuard {
    file: std::fs::File,
    path: PathBuf,
    mode: LockMode,
}

impl LockGuard {
    fn new(file: std::fs::File, path: PathBuf, mode: LockMode) -> Self {
        Self { file, path, mode }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> LockMode {
        self.mode
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        // fs2 unlock errors on drop are ignored deliberately.
        let _ = self.file.unlock();
    }
}

fn lock_file_path(backup_dir: &Path) -> PathBuf {
    backup_dir.join("LOCK")
}

fn open_lock_file(backup_dir: &Path) -> Result<std::fs::File> {
    let path = lock_file_path(backup_dir);
    let f = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .open(&path)
        .with_context(|| format!("open lock file {}", path.display()))?;
    Ok(f)
}

/// Acquire a lock on the backup area. Blocks until acquired.
pub fn acquire_lock(backup_dir: &Path, mode: LockMode) -> Result<LockGuard> {
    let file = open_lock_file(backup_dir)?;
    match mode {
        LockMode::Shared => file
            .lock_shared()
            .with_context(|| format!("lock_shared {}", lock_file_path(backup_dir).display()))?,
        LockMode::Exclusive => file
            .lock_exclusive()
            .with_context(|| format!("lock_exclusive {}", lock_file_path(backup_dir).display()))?,
    }
    Ok(LockGuard::new(file, lock_file_path(backup_dir), mode))
}

/// Writer lock for snapshot/prune.
pub fn acquire_backup_write_lock(backup_dir: &Path) -> Result<LockGuard> {
    acquire_lock(backup_dir, LockMode::Exclusive)
}

/// Reader lock for list/restore.
pub fn acquire_backup_read_lock(backup_dir: &Path) -> Result<LockGuard> {
    acquire_lock(backup_dir, LockMode::Shared)
}
