// tests/stress_churn.rs
//
// Запуск только этого файла:
//   cargo test --test stress_churn -- --nocapture
//
// Churn: много файлов, у каждого несколько версий со случайным (но
// детерминированным — oorandom) содержимым. Проверяем выборочно точные
// байты исторических версий и отсутствие утечек scratch-каталогов.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;

use verfs::{BackendKind, OpenMode, VerfsBuilder, VersioningFs};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("verfstest-churn-{prefix}-{pid}-{t}-{id}"))
}

fn test_fs(root: &Path) -> Result<VersioningFs> {
    let cfg = VerfsBuilder::from_default()
        .backend(BackendKind::Copy)
        .test_clock(Some(10_000))
        .snapshot_retry_ms(10)
        .build();
    VersioningFs::new(root, cfg)
}

fn payload(rng: &mut oorandom::Rand64, len: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(len);
    while data.len() < len {
        data.extend_from_slice(&rng.rand_u64().to_le_bytes());
    }
    data.truncate(len);
    data
}

#[test]
fn churn_many_files_many_versions() -> Result<()> {
    const FILES: usize = 8;
    const VERSIONS: usize = 4;

    let root = unique_root("many");
    let fs = test_fs(&root)?;
    let mut rng = oorandom::Rand64::new(0xC0FFEE);

    // contents[f][v] — байты версии v+1 файла f
    let mut contents: Vec<Vec<Vec<u8>>> = Vec::new();
    for f in 0..FILES {
        let mut versions = Vec::new();
        for _ in 0..VERSIONS {
            let len = 64 + (rng.rand_u64() % 4096) as usize;
            let data = payload(&mut rng, len);
            let mut h = fs.open(&format!("data/file-{f}.bin"), OpenMode::Write, None)?;
            h.write_all(&data)?;
            h.close()?;
            versions.push(data);
        }
        contents.push(versions);
    }

    // у всех файлов полная история
    for f in 0..FILES {
        assert_eq!(fs.version(&format!("data/file-{f}.bin"))?, VERSIONS as u64);
    }

    // выборочная сверка исторических байт
    for f in 0..FILES {
        for v in [1usize, VERSIONS] {
            let mut h = fs.open(
                &format!("data/file-{f}.bin"),
                OpenMode::Read,
                Some(v as u64),
            )?;
            let mut buf = Vec::new();
            h.read_to_end(&mut buf)?;
            h.close()?;
            assert_eq!(
                buf, contents[f][v - 1],
                "file {f} version {v} bytes mismatch"
            );
        }
    }

    // scratch не утёк
    let leftovers = std::fs::read_dir(fs.tmp_dir())?.count();
    assert_eq!(leftovers, 0, "no scratch dirs may remain after churn");
    Ok(())
}
