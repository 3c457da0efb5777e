//! vfs — versioning filesystem поверх внешнего бэкенда.
//!
//! Разделение по подмодулям:
//! - mod.rs      — VersioningFs (поля, layout, open, резолв путей)
//! - open.rs     — versioned open: open(path, mode, version)
//! - handle.rs   — VersionedFile (Read/Write/Seek, snapshot-on-close)
//! - snapshot.rs — staging + вызов бэкенда под write-локом
//! - info.rs     — has_snapshot/list_versions/version/list_info/list_sizes
//! - ops.rs      — remove/remove_dir/rename + prune истории
//! - hide.rs     — листинги со скрытием служебных каталогов
//!
//! Layout на диске:
//!   <root>/...                — пользовательские файлы
//!   <root>/.backups/<sha256>  — репозиторий версий одного файла
//!   <root>/.backups/LOCK      — advisory-лок backup-зоны
//!   <root>/.tmp/<random>/     — scratch для staging/restore

use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};

use crate::backend::{CopyBackend, RdiffBackend, SnapshotOptions, VersionBackend};
use crate::config::{BackendKind, VerfsConfig};
use crate::errors::VerfsError;
use crate::util::{escapes_root, hash_path, relpath};

mod handle;
mod hide;
mod info;
mod open;
mod ops;
mod snapshot;

pub use handle::VersionedFile;
pub use open::{OpenMode, OpenOpts};
pub use ops::VersionCutoff;

/// Имя каталога с репозиториями версий (скрыт из листингов).
pub const BACKUP_DIR_NAME: &str = ".backups";
/// Имя scratch-каталога (скрыт из листингов).
pub const TMP_DIR_NAME: &str = ".tmp";

pub struct VersioningFs {
    root: PathBuf,
    backup_dir: PathBuf,
    tmp_dir: PathBuf,
    cfg: VerfsConfig,
    backend: Box<dyn VersionBackend>,
    // Тестовые часы: следующее значение --current-time для снапшота.
    forced_clock: Option<AtomicI64>,
}

impl VersioningFs {
    /// Открыть (создав при необходимости layout) versioning fs над root.
    /// Бэкенд выбирается конфигом.
    pub fn new(root: impl AsRef<Path>, cfg: VerfsConfig) -> Result<Self> {
        let backend: Box<dyn VersionBackend> = match cfg.backend {
            BackendKind::Rdiff => Box::new(RdiffBackend::new(cfg.rdiff_bin.clone())),
            BackendKind::Copy => Box::new(CopyBackend::new()),
        };
        Self::open_with_backend(root, cfg, backend)
    }

    /// Открыть с явным бэкендом (тесты, кастомные инструменты).
    pub fn open_with_backend(
        root: impl AsRef<Path>,
        cfg: VerfsConfig,
        backend: Box<dyn VersionBackend>,
    ) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let backup_dir = root.join(BACKUP_DIR_NAME);
        let tmp_dir = root.join(TMP_DIR_NAME);

        std::fs::create_dir_all(&root)
            .with_context(|| format!("create root {}", root.display()))?;
        std::fs::create_dir_all(&backup_dir)
            .with_context(|| format!("create {}", backup_dir.display()))?;
        std::fs::create_dir_all(&tmp_dir)
            .with_context(|| format!("create {}", tmp_dir.display()))?;

        let forced_clock = cfg.test_clock.map(AtomicI64::new);

        info!(
            "verfs open: root={}, backend={}, cfg={}",
            root.display(),
            backend.tool_name(),
            cfg
        );

        Ok(Self {
            root,
            backup_dir,
            tmp_dir,
            cfg,
            backend,
            forced_clock,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    pub fn tmp_dir(&self) -> &Path {
        &self.tmp_dir
    }

    pub fn config(&self) -> &VerfsConfig {
        &self.cfg
    }

    pub(crate) fn backend(&self) -> &dyn VersionBackend {
        self.backend.as_ref()
    }

    /// Нормализовать пользовательский путь и получить абсолютный.
    /// Отвергает выход за корень и обращения в служебные каталоги.
    pub(crate) fn resolve(&self, path: &str) -> Result<(String, PathBuf)> {
        if escapes_root(path) {
            return Err(VerfsError::unsupported(format!(
                "path {:?} escapes the filesystem root",
                path
            )));
        }
        let rel = relpath(path);
        if rel.is_empty() {
            return Err(VerfsError::unsupported("empty path"));
        }
        if self.is_hidden(&rel) {
            return Err(VerfsError::not_found(rel));
        }
        let abs = self.root.join(&rel);
        Ok((rel, abs))
    }

    /// Каталог-репозиторий версий для файла.
    pub(crate) fn snap_path(&self, rel: &str) -> PathBuf {
        self.backup_dir.join(hash_path(rel))
    }

    /// Параметры мутирующих операций бэкенда. Тестовые часы тикают на
    /// каждый вызов, чтобы stamps строго возрастали.
    pub(crate) fn snapshot_opts(&self) -> SnapshotOptions {
        let current_time = self
            .forced_clock
            .as_ref()
            .map(|c| c.fetch_add(1, Ordering::Relaxed));
        SnapshotOptions {
            tmp_dir: self.tmp_dir.clone(),
            current_time,
        }
    }
}
