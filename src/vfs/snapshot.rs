//! snapshot — запись новой версии файла через бэкенд.
//!
//! Staging: живой файл копируется в свежий scratch-каталог под именем
//! DATAFILE, и уже этот каталог отдаётся инструменту. Так репозиторий
//! версий каждого файла живёт отдельно и не зависит от соседей по
//! дереву.

use anyhow::{Context, Result};
use log::info;
use std::fs::{self, File};
use std::io;

use crate::backend::DATAFILE;
use crate::errors::VerfsError;
use crate::lock::acquire_backup_write_lock;
use crate::metrics::record_snapshot_taken;
use crate::util::scratch_name;

use super::VersioningFs;

impl VersioningFs {
    /// Снять снапшот одного файла. Файл должен существовать.
    pub fn snapshot(&self, path: &str) -> Result<()> {
        let (rel, abs) = self.resolve(path)?;
        if !abs.exists() {
            return Err(VerfsError::not_found(rel));
        }
        if !abs.is_file() {
            return Err(VerfsError::unsupported(format!(
                "snapshot of non-file {}",
                rel
            )));
        }

        // staging: <tmp>/<random>/datafile
        let stage_dir = self.tmp_dir().join(scratch_name());
        fs::create_dir_all(&stage_dir)
            .with_context(|| format!("create {}", stage_dir.display()))?;
        let staged = stage_dir.join(DATAFILE);

        let result = (|| -> Result<()> {
            let mut src = File::open(&abs).with_context(|| format!("open {}", abs.display()))?;
            let mut dst =
                File::create(&staged).with_context(|| format!("create {}", staged.display()))?;
            io::copy(&mut src, &mut dst)
                .with_context(|| format!("stage {} -> {}", abs.display(), staged.display()))?;
            drop(dst);

            let snap_dir = self.snap_path(&rel);
            let opts = self.snapshot_opts();

            let _lock = acquire_backup_write_lock(self.backup_dir())?;
            self.backend()
                .snapshot(&stage_dir, &snap_dir, &opts)
                .with_context(|| format!("snapshot {}", rel))?;
            Ok(())
        })();

        // staging-каталог убираем в любом исходе
        let _ = fs::remove_dir_all(&stage_dir);

        result?;
        record_snapshot_taken();
        info!("snapshot taken: {} ({})", rel, self.backend().tool_name());
        Ok(())
    }
}
