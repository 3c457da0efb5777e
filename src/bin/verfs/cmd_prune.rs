use anyhow::{anyhow, Result};
use std::path::PathBuf;

use verfs::VersionCutoff;

use crate::cli::open_fs;

/// Удалить историю старше отсечки (--before-version | --before-time).
pub fn exec(
    root: PathBuf,
    path: String,
    before_version: Option<u64>,
    before_time: Option<String>,
) -> Result<()> {
    let cutoff = match (before_version, before_time) {
        (Some(k), None) => VersionCutoff::Ordinal(k),
        (None, Some(ts)) => VersionCutoff::Timestamp(ts),
        _ => {
            return Err(anyhow!(
                "provide exactly one of --before-version / --before-time"
            ))
        }
    };

    let fs = open_fs(root)?;
    fs.remove_versions_before(&path, cutoff)?;
    println!("prune: OK ({}, {} version(s) left)", path, fs.version(&path)?);
    Ok(())
}
