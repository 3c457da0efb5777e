//! info — сведения об истории файла.
//!
//! Версии нумеруются 1..=N поверх отсортированных stamps бэкенда:
//! 1 — старейшая, N — новейшая (она же live-содержимое).

use anyhow::Result;
use std::collections::BTreeMap;

use crate::lock::acquire_backup_read_lock;
use crate::metrics::record_version_listing;
use crate::util::format_ts;

use super::VersioningFs;

impl VersioningFs {
    /// Есть ли у пути записанная история.
    pub fn has_snapshot(&self, path: &str) -> Result<bool> {
        let (rel, _) = self.resolve(path)?;
        Ok(self.snap_path(&rel).is_dir())
    }

    /// Stamps версий по возрастанию (пусто, если истории нет).
    pub fn list_versions(&self, path: &str) -> Result<Vec<i64>> {
        let (rel, _) = self.resolve(path)?;
        let _lock = acquire_backup_read_lock(self.backup_dir())?;
        let stamps = self.backend().list_versions(&self.snap_path(&rel))?;
        record_version_listing();
        Ok(stamps)
    }

    /// Текущая версия файла (количество снапшотов; 0 — истории нет).
    pub fn version(&self, path: &str) -> Result<u64> {
        Ok(self.list_versions(path)?.len() as u64)
    }

    /// Ordinal -> отформатированный таймстамп версии.
    pub fn list_info(&self, path: &str) -> Result<BTreeMap<u64, String>> {
        let stamps = self.list_versions(path)?;
        Ok(stamps
            .iter()
            .enumerate()
            .map(|(i, &stamp)| (i as u64 + 1, format_ts(stamp)))
            .collect())
    }

    /// Ordinal -> человекочитаемый размер инкремента (oldest = 1).
    pub fn list_sizes(&self, path: &str) -> Result<BTreeMap<u64, String>> {
        let (rel, _) = self.resolve(path)?;
        let _lock = acquire_backup_read_lock(self.backup_dir())?;
        let sizes = self.backend().increment_sizes(&self.snap_path(&rel))?;
        Ok(sizes
            .into_iter()
            .enumerate()
            .map(|(i, s)| (i as u64 + 1, s))
            .collect())
    }
}
