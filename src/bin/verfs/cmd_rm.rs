use anyhow::Result;
use std::path::PathBuf;

use crate::cli::open_fs;

/// Удалить файл (с историей) или каталог (--dir, --force — рекурсивно).
pub fn exec(root: PathBuf, path: String, dir: bool, force: bool) -> Result<()> {
    let fs = open_fs(root)?;
    if dir {
        fs.remove_dir(&path, force)?;
    } else {
        fs.remove(&path)?;
    }
    println!("rm: OK ({})", path);
    Ok(())
}
