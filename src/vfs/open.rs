//! open — versioned-open адаптер.
//!
//! Семантика:
//! - version=None: обычный open подлежащей файловой системы; writable
//!   хэндл делает снапшот на close, если файл был изменён.
//! - version=Some(k): только чтение. k — порядковый номер 1..=N поверх
//!   отсортированных stamps бэкенда. k==N — это live-файл (новейшая
//!   версия и есть текущее содержимое); k<N — restore во временный
//!   scratch-каталог, хэндл читает оттуда и убирает за собой.
//!
//! Ошибки различимы по виду (см. errors.rs): неизвестный путь — NotFound,
//! версия вне диапазона — VersionNotFound, запись в versioned-хэндл —
//! UnsupportedOperation. Пустая история никогда не превращается в пустой
//! успех.

use anyhow::{Context, Result};
use log::debug;
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;

use crate::errors::VerfsError;
use crate::lock::acquire_backup_read_lock;
use crate::metrics::{record_restore, record_version_listing};
use crate::util::scratch_name;

use super::{handle::VersionedFile, VersioningFs};

/// Режим открытия файла.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    Write,
    Append,
}

impl OpenMode {
    pub fn is_write(self) -> bool {
        matches!(self, OpenMode::Write | OpenMode::Append)
    }
}

/// Дополнительные опции open.
#[derive(Debug, Clone, Copy)]
pub struct OpenOpts {
    /// false — не делать снапшот на close даже после записи.
    pub take_snapshot: bool,
}

impl Default for OpenOpts {
    fn default() -> Self {
        Self { take_snapshot: true }
    }
}

impl VersioningFs {
    /// Открыть файл, опционально — конкретную историческую версию.
    pub fn open(
        &self,
        path: &str,
        mode: OpenMode,
        version: Option<u64>,
    ) -> Result<VersionedFile<'_>> {
        self.open_with(path, mode, version, OpenOpts::default())
    }

    /// Как open(), с опциями. Write/Append без версии создают
    /// отсутствующие родительские каталоги сами — mkdir перед каждой
    /// записью от вызывающего не требуется.
    pub fn open_with(
        &self,
        path: &str,
        mode: OpenMode,
        version: Option<u64>,
        opts: OpenOpts,
    ) -> Result<VersionedFile<'_>> {
        let (rel, abs) = self.resolve(path)?;

        let version = match version {
            None => {
                // passthrough: семантика подлежащей fs
                let file = match mode {
                    OpenMode::Read => File::open(&abs).map_err(|e| {
                        if e.kind() == ErrorKind::NotFound {
                            VerfsError::not_found(rel.clone())
                        } else {
                            anyhow::Error::new(e).context(format!("open {}", abs.display()))
                        }
                    })?,
                    OpenMode::Write | OpenMode::Append => {
                        if let Some(parent) = abs.parent() {
                            std::fs::create_dir_all(parent)
                                .with_context(|| format!("create {}", parent.display()))?;
                        }
                        let mut oo = OpenOptions::new();
                        oo.write(true).create(true);
                        if mode == OpenMode::Append {
                            oo.append(true);
                        } else {
                            oo.truncate(true);
                        }
                        oo.open(&abs)
                            .with_context(|| format!("open {} for write", abs.display()))?
                    }
                };
                return Ok(VersionedFile::live(
                    self,
                    rel,
                    file,
                    mode.is_write(),
                    opts.take_snapshot,
                ));
            }
            Some(v) => v,
        };

        // versioned open: только чтение, записи не бывает
        if mode.is_write() {
            return Err(VerfsError::unsupported(format!(
                "cannot open {} version {} for writing",
                rel, version
            )));
        }
        if version == 0 {
            return Err(VerfsError::version_not_found(rel, version));
        }

        let live_exists = abs.is_file();
        let snap_dir = self.snap_path(&rel);
        if !live_exists && !snap_dir.is_dir() {
            return Err(VerfsError::not_found(rel));
        }

        // Под shared-локом: writer не перепишет репозиторий между
        // листингом и restore.
        let _lock = acquire_backup_read_lock(self.backup_dir())?;

        let stamps = self.backend().list_versions(&snap_dir)?;
        record_version_listing();
        let n = stamps.len() as u64;

        if version > n {
            return Err(VerfsError::version_not_found(rel, version));
        }

        if version == n && live_exists {
            let file =
                File::open(&abs).with_context(|| format!("open {}", abs.display()))?;
            debug!("open {} version {} -> live file", rel, version);
            return Ok(VersionedFile::versioned_live(self, rel, file));
        }

        // Историческая версия: restore в свежий scratch-каталог.
        let stamp = stamps[(version - 1) as usize];
        let dest_dir = self.tmp_dir().join(scratch_name());
        let restored = self
            .backend()
            .restore(&snap_dir, stamp, &dest_dir)
            .with_context(|| format!("restore {} version {} (stamp {})", rel, version, stamp))?;

        let file =
            File::open(&restored).with_context(|| format!("open {}", restored.display()))?;
        let bytes = file.metadata().map(|m| m.len()).unwrap_or(0);
        record_restore(bytes);
        debug!(
            "open {} version {} -> restored stamp {} ({} B)",
            rel, version, stamp, bytes
        );
        Ok(VersionedFile::temp(self, rel, file, dest_dir))
    }
}
