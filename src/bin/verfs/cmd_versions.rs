use anyhow::Result;
use std::path::PathBuf;

use crate::cli::open_fs;

/// Список версий файла: ordinal, таймстамп, размер инкремента.
pub fn exec(root: PathBuf, path: String, json: bool) -> Result<()> {
    let fs = open_fs(root)?;
    let info = fs.list_info(&path)?;
    let sizes = fs.list_sizes(&path)?;

    if json {
        let entries: Vec<serde_json::Value> = info
            .iter()
            .map(|(k, ts)| {
                serde_json::json!({
                    "version": k,
                    "timestamp": ts,
                    "size": sizes.get(k),
                })
            })
            .collect();
        let obj = serde_json::json!({
            "path": path,
            "versions": entries,
        });
        println!("{}", serde_json::to_string_pretty(&obj)?);
        return Ok(());
    }

    if info.is_empty() {
        println!("(no versions)");
        return Ok(());
    }
    for (k, ts) in &info {
        match sizes.get(k) {
            Some(sz) => println!("{:4}  {}  {}", k, ts, sz),
            None => println!("{:4}  {}", k, ts),
        }
    }
    Ok(())
}
