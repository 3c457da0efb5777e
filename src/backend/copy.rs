//! CopyBackend — встроенное full-copy хранилище версий.
//!
//! Никакого внешнего инструмента: каждая версия хранится целиком как
//! gzip-кадр <repo>/<stamp>.gz. Подходит для тестов и для хостов без
//! rdiff-backup (ценой места: кадры не инкрементальные).
//!
//! Отличия от rdiff-backup, закреплённые контрактом:
//! - нет ограничения "один снапшот в секунду": при коллизии stamp
//!   поднимается до max+1, версии строго возрастают;
//! - remove_older_than никогда не трогает самый новый кадр (у
//!   rdiff-backup текущее зеркало тоже неудаляемо).

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::debug;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use crate::errors::VerfsError;
use crate::metrics::record_backend_error;
use crate::util::{now_secs, parse_ts};

use super::{SnapshotOptions, VersionBackend, DATAFILE};

#[derive(Debug, Default)]
pub struct CopyBackend;

impl CopyBackend {
    pub fn new() -> Self {
        Self
    }

    fn frame_path(snap_dir: &Path, stamp: i64) -> PathBuf {
        snap_dir.join(format!("{stamp}.gz"))
    }

    fn scan_stamps(snap_dir: &Path) -> Result<Vec<i64>> {
        let mut stamps = Vec::new();
        if !snap_dir.is_dir() {
            return Ok(stamps);
        }
        for entry in fs::read_dir(snap_dir)
            .with_context(|| format!("read_dir {}", snap_dir.display()))?
        {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let Some(stem) = name.strip_suffix(".gz") {
                if let Ok(stamp) = stem.parse::<i64>() {
                    stamps.push(stamp);
                }
            }
        }
        stamps.sort_unstable();
        Ok(stamps)
    }

    fn parse_cutoff(cutoff: &str) -> Result<i64> {
        let s = cutoff.trim();
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            return s.parse::<i64>().context("parse epoch cutoff");
        }
        parse_ts(s).ok_or_else(|| {
            record_backend_error();
            VerfsError::backend(format!("bad cutoff {:?}", cutoff))
        })
    }
}

impl VersionBackend for CopyBackend {
    fn tool_name(&self) -> &str {
        "copy"
    }

    fn snapshot(&self, src_dir: &Path, snap_dir: &Path, opts: &SnapshotOptions) -> Result<()> {
        let src = src_dir.join(DATAFILE);
        let mut input = File::open(&src).with_context(|| format!("open {}", src.display()))?;

        fs::create_dir_all(snap_dir)
            .with_context(|| format!("create {}", snap_dir.display()))?;

        let mut stamp = opts.current_time.unwrap_or_else(now_secs);
        if let Some(&max) = Self::scan_stamps(snap_dir)?.last() {
            if stamp <= max {
                stamp = max + 1;
            }
        }

        let frame = Self::frame_path(snap_dir, stamp);
        let out = File::create(&frame).with_context(|| format!("create {}", frame.display()))?;
        let mut enc = GzEncoder::new(out, Compression::default());
        io::copy(&mut input, &mut enc).with_context(|| format!("write {}", frame.display()))?;
        enc.finish()?.sync_all().ok();

        debug!("copy backend: recorded stamp {} in {}", stamp, snap_dir.display());
        Ok(())
    }

    fn list_versions(&self, snap_dir: &Path) -> Result<Vec<i64>> {
        Self::scan_stamps(snap_dir)
    }

    fn restore(&self, snap_dir: &Path, stamp: i64, dest_dir: &Path) -> Result<PathBuf> {
        let frame = Self::frame_path(snap_dir, stamp);
        if !frame.is_file() {
            record_backend_error();
            return Err(VerfsError::backend(format!(
                "no frame for stamp {} in {}",
                stamp,
                snap_dir.display()
            )));
        }

        fs::create_dir_all(dest_dir)
            .with_context(|| format!("create {}", dest_dir.display()))?;
        let restored = dest_dir.join(DATAFILE);

        let input = File::open(&frame).with_context(|| format!("open {}", frame.display()))?;
        let mut dec = GzDecoder::new(input);
        let mut out =
            File::create(&restored).with_context(|| format!("create {}", restored.display()))?;
        io::copy(&mut dec, &mut out).with_context(|| format!("inflate {}", frame.display()))?;
        Ok(restored)
    }

    fn increment_sizes(&self, snap_dir: &Path) -> Result<Vec<String>> {
        let mut sizes = Vec::new();
        for stamp in Self::scan_stamps(snap_dir)? {
            let frame = Self::frame_path(snap_dir, stamp);
            let bytes = fs::metadata(&frame)
                .with_context(|| format!("stat {}", frame.display()))?
                .len();
            sizes.push(human_size(bytes));
        }
        Ok(sizes)
    }

    fn remove_older_than(
        &self,
        snap_dir: &Path,
        cutoff: &str,
        _opts: &SnapshotOptions,
    ) -> Result<()> {
        let cut = Self::parse_cutoff(cutoff)?;
        let stamps = Self::scan_stamps(snap_dir)?;
        let newest = match stamps.last() {
            Some(&s) => s,
            None => return Ok(()),
        };
        for stamp in stamps {
            if stamp < cut && stamp != newest {
                let frame = Self::frame_path(snap_dir, stamp);
                fs::remove_file(&frame)
                    .with_context(|| format!("remove {}", frame.display()))?;
                debug!("copy backend: pruned stamp {} in {}", stamp, snap_dir.display());
            }
        }
        Ok(())
    }
}

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut val = bytes as f64;
    let mut unit = 0;
    while val >= 1024.0 && unit + 1 < UNITS.len() {
        val /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", val, UNITS[unit])
    }
}
