use anyhow::Result;
use std::path::PathBuf;

use crate::cli::open_fs;

/// Листинг каталога (служебные каталоги скрыты, --hidden показывает).
pub fn exec(root: PathBuf, path: Option<String>, hidden: bool) -> Result<()> {
    let fs = open_fs(root)?;
    let dir = path.unwrap_or_default();
    let entries = fs.list_dir(&dir, hidden)?;
    if entries.is_empty() {
        println!("(empty)");
        return Ok(());
    }
    for name in entries {
        println!("{name}");
    }
    Ok(())
}
