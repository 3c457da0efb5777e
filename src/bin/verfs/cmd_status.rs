use anyhow::{Context, Result};
use std::path::PathBuf;

use verfs::metrics;

use crate::cli::open_fs;

/// Сводка: layout, число репозиториев версий, метрики процесса.
pub fn exec(root: PathBuf, json: bool) -> Result<()> {
    let fs = open_fs(root)?;

    // репозитории версий = подкаталоги backup-зоны (LOCK — файл)
    let mut repos = 0u64;
    for entry in std::fs::read_dir(fs.backup_dir())
        .with_context(|| format!("read_dir {}", fs.backup_dir().display()))?
    {
        if entry?.file_type()?.is_dir() {
            repos += 1;
        }
    }

    let files = fs.walk_files("")?;
    let m = metrics::snapshot();

    if json {
        let obj = serde_json::json!({
            "root": fs.root().display().to_string(),
            "backup_dir": fs.backup_dir().display().to_string(),
            "backend": format!("{:?}", fs.config().backend),
            "files": files.len(),
            "version_repositories": repos,
            "metrics": m,
        });
        println!("{}", serde_json::to_string_pretty(&obj)?);
        return Ok(());
    }

    println!("root               = {}", fs.root().display());
    println!("backup dir         = {}", fs.backup_dir().display());
    println!("backend            = {:?}", fs.config().backend);
    println!("files              = {}", files.len());
    println!("version repos      = {}", repos);
    println!("snapshots taken    = {}", m.snapshots_taken);
    println!("snapshot retries   = {}", m.snapshot_retries);
    println!("snapshot failures  = {}", m.snapshot_failures);
    println!("restores           = {}", m.restores_total);
    println!("restore bytes      = {}", m.restore_bytes);
    println!("version listings   = {}", m.version_listings);
    println!("backend errors     = {}", m.backend_errors);
    println!("prune runs         = {}", m.prune_runs);
    Ok(())
}
