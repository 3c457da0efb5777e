//! handle — VersionedFile, файловый хэндл versioning fs.
//!
//! Три формы:
//! - live writable: запоминает факт записи и на close делает снапшот
//!   (с ретраями: rdiff-backup не умеет два снапшота одного репозитория
//!   в одну секунду);
//! - live read-only (versioned open новейшей версии);
//! - temp read-only (восстановленная версия): на close удаляет свой
//!   scratch-каталог.
//!
//! close() идемпотентен; Drop вызывает close() best-effort, ошибки
//! снапшота при этом только логируются — кто хочет их видеть, зовёт
//! close() явно.

use anyhow::Result;
use log::{error, warn};
use std::fs::File;
use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use crate::metrics::{record_snapshot_failure, record_snapshot_retry};

use super::VersioningFs;

pub struct VersionedFile<'a> {
    fs: &'a VersioningFs,
    path: String,
    file: Option<File>,
    writable: bool,
    take_snapshot: bool,
    modified: bool,
    // scratch-каталог restore, удаляется на close
    scratch: Option<PathBuf>,
    closed: bool,
}

impl<'a> VersionedFile<'a> {
    pub(super) fn live(
        fs: &'a VersioningFs,
        path: String,
        file: File,
        writable: bool,
        take_snapshot: bool,
    ) -> Self {
        Self {
            fs,
            path,
            file: Some(file),
            writable,
            take_snapshot,
            modified: false,
            scratch: None,
            closed: false,
        }
    }

    pub(super) fn versioned_live(fs: &'a VersioningFs, path: String, file: File) -> Self {
        Self {
            fs,
            path,
            file: Some(file),
            writable: false,
            take_snapshot: false,
            modified: false,
            scratch: None,
            closed: false,
        }
    }

    pub(super) fn temp(fs: &'a VersioningFs, path: String, file: File, scratch: PathBuf) -> Self {
        Self {
            fs,
            path,
            file: Some(file),
            writable: false,
            take_snapshot: false,
            modified: false,
            scratch: Some(scratch),
            closed: false,
        }
    }

    /// Относительный путь файла в fs.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// true для read-only (versioned) хэндлов.
    pub fn is_read_only(&self) -> bool {
        !self.writable
    }

    fn inner(&mut self) -> io::Result<&mut File> {
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::new(ErrorKind::Other, "file handle already closed"))
    }

    /// Закрыть хэндл: отпустить fd, убрать scratch, при необходимости —
    /// снапшот изменённого файла.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.file.take(); // drop fd

        if let Some(scratch) = self.scratch.take() {
            if let Err(e) = std::fs::remove_dir_all(&scratch) {
                warn!("failed to remove scratch {}: {}", scratch.display(), e);
            }
        }

        if !(self.writable && self.modified && self.take_snapshot) {
            return Ok(());
        }

        let max_tries = self.fs.config().snapshot_max_tries.max(1);
        let retry_ms = self.fs.config().snapshot_retry_ms;
        let mut last_err = None;
        for attempt in 1..=max_tries {
            match self.fs.snapshot(&self.path) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    if attempt < max_tries {
                        // rdiff-backup требует паузу между снапшотами
                        // одного репозитория
                        record_snapshot_retry();
                        warn!(
                            "snapshot of {} failed (attempt {}/{}): {:#}",
                            self.path, attempt, max_tries, e
                        );
                        thread::sleep(Duration::from_millis(retry_ms));
                    }
                    last_err = Some(e);
                }
            }
        }
        record_snapshot_failure();
        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("snapshot failed")))
    }
}

impl std::fmt::Debug for VersionedFile<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionedFile")
            .field("path", &self.path)
            .field("writable", &self.writable)
            .field("take_snapshot", &self.take_snapshot)
            .field("modified", &self.modified)
            .field("scratch", &self.scratch)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl Read for VersionedFile<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner()?.read(buf)
    }
}

impl Write for VersionedFile<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.writable {
            return Err(io::Error::new(
                ErrorKind::Unsupported,
                "versioned file handles are read-only",
            ));
        }
        let n = self.inner()?.write(buf)?;
        if n > 0 {
            self.modified = true;
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.writable {
            return Err(io::Error::new(
                ErrorKind::Unsupported,
                "versioned file handles are read-only",
            ));
        }
        self.inner()?.flush()
    }
}

impl Seek for VersionedFile<'_> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner()?.seek(pos)
    }
}

impl Drop for VersionedFile<'_> {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(e) = self.close() {
                error!("close of {} failed in drop: {:#}", self.path, e);
            }
        }
    }
}
