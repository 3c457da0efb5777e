use anyhow::Result;
use std::path::PathBuf;

use crate::cli::open_fs;

/// Явный снапшот файла (обычно они делаются сами на close).
pub fn exec(root: PathBuf, path: String) -> Result<()> {
    let fs = open_fs(root)?;
    fs.snapshot(&path)?;
    println!("snapshot: OK ({}, version {})", path, fs.version(&path)?);
    Ok(())
}
