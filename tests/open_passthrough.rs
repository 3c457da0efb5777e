// tests/open_passthrough.rs
//
// Запуск только этого файла:
//   cargo test --test open_passthrough -- --nocapture
//
// Покрываем:
// 1) open без версии ведёт себя как подлежащая fs: те же байты, те же
//    ошибки (NotFound на чтении отсутствующего пути).
// 2) Append дописывает, Write усекает.
// 3) Служебные каталоги (.backups/.tmp) скрыты из листингов и walk.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;

use verfs::{BackendKind, OpenMode, VerfsBuilder, VerfsError, VersioningFs};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("verfstest-pass-{prefix}-{pid}-{t}-{id}"))
}

fn test_fs(root: &Path) -> Result<VersioningFs> {
    let cfg = VerfsBuilder::from_default()
        .backend(BackendKind::Copy)
        .test_clock(Some(1_000))
        .snapshot_retry_ms(10)
        .build();
    VersioningFs::new(root, cfg)
}

fn write_file(fs: &VersioningFs, path: &str, data: &[u8]) -> Result<()> {
    let mut f = fs.open(path, OpenMode::Write, None)?;
    f.write_all(data)?;
    f.close()
}

fn read_file(fs: &VersioningFs, path: &str, version: Option<u64>) -> Result<Vec<u8>> {
    let mut f = fs.open(path, OpenMode::Read, version)?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    f.close()?;
    Ok(buf)
}

#[test]
fn write_then_read_same_bytes() -> Result<()> {
    let root = unique_root("roundtrip");
    let fs = test_fs(&root)?;

    write_file(&fs, "docs/report.txt", b"hello versioning")?;
    assert_eq!(read_file(&fs, "docs/report.txt", None)?, b"hello versioning");

    // Write усекает
    write_file(&fs, "docs/report.txt", b"short")?;
    assert_eq!(read_file(&fs, "docs/report.txt", None)?, b"short");
    Ok(())
}

#[test]
fn append_appends() -> Result<()> {
    let root = unique_root("append");
    let fs = test_fs(&root)?;

    write_file(&fs, "log.txt", b"one\n")?;
    {
        let mut f = fs.open("log.txt", OpenMode::Append, None)?;
        f.write_all(b"two\n")?;
        f.close()?;
    }
    assert_eq!(read_file(&fs, "log.txt", None)?, b"one\ntwo\n");
    Ok(())
}

#[test]
fn missing_path_is_not_found() -> Result<()> {
    let root = unique_root("missing");
    let fs = test_fs(&root)?;

    let err = fs.open("nope.txt", OpenMode::Read, None).unwrap_err();
    match err.downcast_ref::<VerfsError>() {
        Some(VerfsError::NotFound(p)) => assert_eq!(p, "nope.txt"),
        other => panic!("expected NotFound, got {:?}", other),
    }
    Ok(())
}

#[test]
fn traversal_is_rejected() -> Result<()> {
    let root = unique_root("traversal");
    let fs = test_fs(&root)?;

    let err = fs.open("../evil", OpenMode::Read, None).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<VerfsError>(),
        Some(VerfsError::UnsupportedOperation(_))
    ));
    Ok(())
}

#[test]
fn hidden_dirs_filtered_from_listings() -> Result<()> {
    let root = unique_root("hidden");
    let fs = test_fs(&root)?;

    write_file(&fs, "a.txt", b"a")?;
    write_file(&fs, "sub/b.txt", b"b")?;

    let names = fs.list_dir("", false)?;
    assert_eq!(names, vec!["a.txt".to_string(), "sub".to_string()]);

    // с include_hidden служебные каталоги видны
    let all = fs.list_dir("", true)?;
    assert!(all.contains(&".backups".to_string()));
    assert!(all.contains(&".tmp".to_string()));

    let files = fs.walk_files("")?;
    assert_eq!(files, vec!["a.txt".to_string(), "sub/b.txt".to_string()]);

    // скрытый путь не открывается как обычный
    assert!(fs.open(".backups/LOCK", OpenMode::Read, None).is_err());
    assert!(!fs.exists(".tmp"));
    Ok(())
}
