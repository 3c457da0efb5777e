use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::PathBuf;

use verfs::OpenMode;

use crate::cli::open_fs;

/// Вывести файл (live или конкретную версию) в stdout или --out.
pub fn exec(root: PathBuf, path: String, version: Option<u64>, out: Option<PathBuf>) -> Result<()> {
    let fs = open_fs(root)?;
    let mut f = fs.open(&path, OpenMode::Read, version)?;

    match out {
        Some(p) => {
            let mut dst =
                std::fs::File::create(&p).with_context(|| format!("create {}", p.display()))?;
            io::copy(&mut f, &mut dst)?;
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            io::copy(&mut f, &mut lock)?;
            lock.flush()?;
        }
    }
    f.close()?;
    Ok(())
}
