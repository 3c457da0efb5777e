use anyhow::Result;
use std::path::PathBuf;

use crate::cli::open_fs;

/// Переименовать/переместить; история следует за файлами.
pub fn exec(root: PathBuf, src: String, dst: String) -> Result<()> {
    let fs = open_fs(root)?;
    fs.rename(&src, &dst)?;
    println!("mv: OK ({} -> {})", src, dst);
    Ok(())
}
