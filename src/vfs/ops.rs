//! ops — операции над пространством имён + prune истории.
//!
//! Инвариант: история файла следует за самим файлом. remove удаляет
//! репозиторий версий вместе с live-файлом, rename переносит его под
//! новый хэш пути, prune отдаёт отсечку бэкенду.

use anyhow::{Context, Result};
use log::{debug, info};
use std::fs;

use crate::errors::VerfsError;
use crate::lock::acquire_backup_write_lock;
use crate::metrics::record_prune_run;
use crate::util::is_valid_time_format;

use super::VersioningFs;

/// Отсечка для prune: порядковый номер версии или таймстамп
/// '%Y-%m-%dT%H:%M:%S'.
#[derive(Debug, Clone)]
pub enum VersionCutoff {
    Ordinal(u64),
    Timestamp(String),
}

impl VersioningFs {
    /// Удалить файл вместе с его историей.
    pub fn remove(&self, path: &str) -> Result<()> {
        let (rel, abs) = self.resolve(path)?;
        if abs.is_dir() {
            return Err(VerfsError::unsupported(format!(
                "remove of directory {} (use remove_dir)",
                rel
            )));
        }
        if !abs.exists() {
            return Err(VerfsError::not_found(rel));
        }
        fs::remove_file(&abs).with_context(|| format!("remove {}", abs.display()))?;
        self.drop_history(&rel)?;
        info!("removed {} (history dropped)", rel);
        Ok(())
    }

    /// Удалить каталог. force=true удаляет рекурсивно вместе с историей
    /// всех файлов под ним; иначе каталог должен быть пуст.
    pub fn remove_dir(&self, path: &str, force: bool) -> Result<()> {
        let (rel, abs) = self.resolve(path)?;
        if !abs.exists() {
            return Err(VerfsError::not_found(rel));
        }
        if !abs.is_dir() {
            return Err(VerfsError::unsupported(format!(
                "remove_dir of non-directory {}",
                rel
            )));
        }

        // историю роняем только после успешного удаления каталога
        let affected = self.walk_files(&rel)?;

        if force {
            fs::remove_dir_all(&abs)
                .with_context(|| format!("remove_dir_all {}", abs.display()))?;
        } else {
            fs::remove_dir(&abs)
                .with_context(|| format!("remove_dir {} (not empty?)", abs.display()))?;
        }

        for file in affected {
            self.drop_history(&file)?;
        }
        info!("removed dir {}", rel);
        Ok(())
    }

    /// Переименовать/переместить файл или каталог; история переезжает
    /// следом (хэш пути меняется).
    pub fn rename(&self, src: &str, dst: &str) -> Result<()> {
        let (rel_src, abs_src) = self.resolve(src)?;
        let (rel_dst, abs_dst) = self.resolve(dst)?;
        if !abs_src.exists() {
            return Err(VerfsError::not_found(rel_src));
        }

        // список затронутых файлов собираем до rename
        let affected: Vec<String> = if abs_src.is_dir() {
            self.walk_files(&rel_src)?
        } else {
            vec![rel_src.clone()]
        };

        if let Some(parent) = abs_dst.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        fs::rename(&abs_src, &abs_dst)
            .with_context(|| format!("rename {} -> {}", abs_src.display(), abs_dst.display()))?;

        let _lock = acquire_backup_write_lock(self.backup_dir())?;
        for old_rel in affected {
            let new_rel = if old_rel == rel_src {
                rel_dst.clone()
            } else {
                // файл внутри переносимого каталога
                format!("{}{}", rel_dst, &old_rel[rel_src.len()..])
            };
            let old_snap = self.snap_path(&old_rel);
            if old_snap.is_dir() {
                let new_snap = self.snap_path(&new_rel);
                if new_snap.exists() {
                    fs::remove_dir_all(&new_snap)
                        .with_context(|| format!("replace {}", new_snap.display()))?;
                }
                fs::rename(&old_snap, &new_snap).with_context(|| {
                    format!("move history {} -> {}", old_snap.display(), new_snap.display())
                })?;
                debug!("history moved: {} -> {}", old_rel, new_rel);
            }
        }
        info!("renamed {} -> {}", rel_src, rel_dst);
        Ok(())
    }

    /// Синоним rename для файлов.
    pub fn move_file(&self, src: &str, dst: &str) -> Result<()> {
        self.rename(src, dst)
    }

    /// Удалить версии старше отсечки. Ordinal k оставляет версии k..=N
    /// (допустим только 2..=N); Timestamp валидируется по формату.
    pub fn remove_versions_before(&self, path: &str, cutoff: VersionCutoff) -> Result<()> {
        let (rel, abs) = self.resolve(path)?;
        if !abs.exists() {
            return Err(VerfsError::not_found(rel));
        }
        if !abs.is_file() {
            return Err(VerfsError::unsupported(format!(
                "prune of non-file {}",
                rel
            )));
        }

        let cutoff_str = match cutoff {
            VersionCutoff::Ordinal(k) => {
                let stamps = self.list_versions(&rel)?;
                let n = stamps.len() as u64;
                // отсечка по первой версии (или за диапазоном) не имеет смысла
                if k <= 1 || k > n {
                    return Err(VerfsError::invalid_version(format!(
                        "ordinal {} out of prune range 2..={}",
                        k, n
                    )));
                }
                stamps[(k - 1) as usize].to_string()
            }
            VersionCutoff::Timestamp(ts) => {
                if !is_valid_time_format(&ts) {
                    return Err(VerfsError::invalid_version(format!(
                        "bad timestamp {:?} (want %Y-%m-%dT%H:%M:%S)",
                        ts
                    )));
                }
                ts
            }
        };

        let snap_dir = self.snap_path(&rel);
        let opts = self.snapshot_opts();
        let _lock = acquire_backup_write_lock(self.backup_dir())?;
        self.backend()
            .remove_older_than(&snap_dir, &cutoff_str, &opts)
            .with_context(|| format!("prune {} before {}", rel, cutoff_str))?;
        record_prune_run();
        info!("pruned {} before {}", rel, cutoff_str);
        Ok(())
    }

    fn drop_history(&self, rel: &str) -> Result<()> {
        let snap_dir = self.snap_path(rel);
        if snap_dir.is_dir() {
            let _lock = acquire_backup_write_lock(self.backup_dir())?;
            fs::remove_dir_all(&snap_dir)
                .with_context(|| format!("drop history {}", snap_dir.display()))?;
        }
        Ok(())
    }
}
