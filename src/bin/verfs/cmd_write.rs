use anyhow::{Context, Result};
use std::io::{self, Read, Write};
use std::path::PathBuf;

use verfs::{OpenMode, OpenOpts};

use crate::cli::open_fs;

/// Записать файл (из stdin или --input); снапшот на close, если не
/// отключён флагом.
pub fn exec(
    root: PathBuf,
    path: String,
    input: Option<PathBuf>,
    append: bool,
    no_snapshot: bool,
) -> Result<()> {
    let fs = open_fs(root)?;

    let data = match input {
        Some(p) => std::fs::read(&p).with_context(|| format!("read {}", p.display()))?,
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("read stdin")?;
            buf
        }
    };

    let mode = if append { OpenMode::Append } else { OpenMode::Write };
    let opts = OpenOpts {
        take_snapshot: !no_snapshot,
    };
    let mut f = fs.open_with(&path, mode, None, opts)?;
    f.write_all(&data).with_context(|| format!("write {}", path))?;
    f.close()?;

    println!("write: OK ({} B, version {})", data.len(), fs.version(&path)?);
    Ok(())
}
