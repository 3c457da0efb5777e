//! RdiffBackend — вызов rdiff-backup как внешнего процесса.
//!
//! Протокол (повторяет то, как инструментом пользуются руками):
//! - snapshot: rdiff-backup --parsable-output --no-eas --no-file-statistics
//!             --no-acls [--current-time N] --tempdir <tmp> <src> <repo>
//! - list:     rdiff-backup --parsable-output -l <repo>
//!             (строки вида "<epoch> <type>")
//! - restore:  rdiff-backup --restore-as-of <epoch> <repo> <dest>
//! - sizes:    rdiff-backup --parsable-output --list-increment-sizes <repo>
//!             (две строки заголовка, дальше инкременты от нового к старому)
//! - prune:    rdiff-backup --parsable-output --force
//!             --remove-older-than <cutoff> --tempdir <tmp> <repo>
//!
//! Отсутствие бинаря — это отказ внешнего коллаборатора
//! (VerfsError::BackendUnavailable), а не баг адаптера.

use anyhow::{Context, Result};
use log::{debug, warn};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::errors::VerfsError;
use crate::metrics::record_backend_error;

use super::{SnapshotOptions, VersionBackend, DATAFILE};

/// Предупреждения rdiff-backup, которые не считаются ошибкой.
fn is_ignorable_stderr(line: &str) -> bool {
    line.starts_with("Warning: could not determine case")
}

pub struct RdiffBackend {
    bin: String,
}

impl RdiffBackend {
    pub fn new<S: Into<String>>(bin: S) -> Self {
        Self { bin: bin.into() }
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        debug!("rdiff-backup invoke: {} {}", self.bin, args.join(" "));
        let out = Command::new(&self.bin).args(args).output().map_err(|e| {
            record_backend_error();
            if e.kind() == ErrorKind::NotFound {
                VerfsError::backend_unavailable(format!("{} not found in PATH", self.bin))
            } else {
                VerfsError::backend_unavailable(format!("failed to spawn {}: {}", self.bin, e))
            }
        })?;
        Ok(out)
    }

    /// Выполнить команду и провалиться, если stderr содержит что-то,
    /// кроме игнорируемых предупреждений.
    fn run_checked(&self, args: &[&str]) -> Result<Output> {
        let out = self.run(args)?;
        let stderr = String::from_utf8_lossy(&out.stderr);
        let noise: Vec<&str> = stderr
            .lines()
            .filter(|l| !l.trim().is_empty() && !is_ignorable_stderr(l))
            .collect();
        if !noise.is_empty() || !out.status.success() {
            record_backend_error();
            warn!("rdiff-backup failed (status {:?}): {}", out.status.code(), stderr.trim());
            return Err(VerfsError::backend(format!(
                "rdiff-backup exited with status {:?}: {}",
                out.status.code(),
                noise.join("; ")
            )));
        }
        Ok(out)
    }
}

impl VersionBackend for RdiffBackend {
    fn tool_name(&self) -> &str {
        "rdiff-backup"
    }

    fn snapshot(&self, src_dir: &Path, snap_dir: &Path, opts: &SnapshotOptions) -> Result<()> {
        let src = src_dir.to_string_lossy().into_owned();
        let dst = snap_dir.to_string_lossy().into_owned();
        let tmp = opts.tmp_dir.to_string_lossy().into_owned();

        let mut args: Vec<String> = vec![
            "--parsable-output".into(),
            "--no-eas".into(),
            "--no-file-statistics".into(),
            "--no-acls".into(),
        ];
        if let Some(t) = opts.current_time {
            args.push("--current-time".into());
            args.push(t.to_string());
        }
        args.push("--tempdir".into());
        args.push(tmp);
        args.push(src);
        args.push(dst);

        let arg_refs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
        self.run_checked(&arg_refs)?;
        Ok(())
    }

    fn list_versions(&self, snap_dir: &Path) -> Result<Vec<i64>> {
        if !snap_dir.exists() {
            return Ok(Vec::new());
        }
        let repo = snap_dir.to_string_lossy().into_owned();
        let out = self.run(&["--parsable-output", "-l", &repo])?;

        let stdout = String::from_utf8_lossy(&out.stdout);
        let mut versions = Vec::new();
        for line in stdout.lines() {
            // "<epoch> <type>"
            if let Some(first) = line.split_whitespace().next() {
                let stamp = first
                    .parse::<i64>()
                    .with_context(|| format!("parse increment stamp {:?}", first))?;
                versions.push(stamp);
            }
        }
        versions.sort_unstable();
        Ok(versions)
    }

    fn restore(&self, snap_dir: &Path, stamp: i64, dest_dir: &Path) -> Result<PathBuf> {
        let repo = snap_dir.to_string_lossy().into_owned();
        let dest = dest_dir.to_string_lossy().into_owned();
        let when = stamp.to_string();

        self.run_checked(&["--restore-as-of", &when, &repo, &dest])?;

        let restored = dest_dir.join(DATAFILE);
        if !restored.is_file() {
            record_backend_error();
            return Err(VerfsError::backend(format!(
                "restore of stamp {} produced no {} in {}",
                stamp,
                DATAFILE,
                dest_dir.display()
            )));
        }
        Ok(restored)
    }

    fn increment_sizes(&self, snap_dir: &Path) -> Result<Vec<String>> {
        if !snap_dir.exists() {
            return Ok(Vec::new());
        }
        let repo = snap_dir.to_string_lossy().into_owned();
        let out = self.run(&["--parsable-output", "--list-increment-sizes", &repo])?;

        let stdout = String::from_utf8_lossy(&out.stdout);
        let lines: Vec<&str> = stdout.lines().collect();
        if lines.len() < 3 {
            return Ok(Vec::new());
        }

        // первые две строки — заголовок; дальше инкременты от нового к
        // старому, колонки 5..6 = "<size> <unit>"
        let mut sizes = Vec::new();
        for line in lines[2..].iter().rev() {
            let cols: Vec<&str> = line.split_whitespace().collect();
            if cols.len() >= 7 {
                sizes.push(format!("{} {}", cols[5], cols[6]));
            }
        }
        Ok(sizes)
    }

    fn remove_older_than(
        &self,
        snap_dir: &Path,
        cutoff: &str,
        opts: &SnapshotOptions,
    ) -> Result<()> {
        let repo = snap_dir.to_string_lossy().into_owned();
        let tmp = opts.tmp_dir.to_string_lossy().into_owned();
        self.run_checked(&[
            "--parsable-output",
            "--force",
            "--remove-older-than",
            cutoff,
            "--tempdir",
            &tmp,
            &repo,
        ])?;
        Ok(())
    }
}
