//! util — общие хелперы (вынесено из модулей vfs/backend).
//!
//! Содержит:
//! - relpath(): нормализация пользовательского пути (без ведущих '/', без '.').
//! - hash_path(): sha256-хэш относительного пути (имя каталога снапшотов).
//! - format_ts()/parse_ts(): unix-секунды <-> '%Y-%m-%dT%H:%M:%S' (UTC).
//! - is_valid_time_format(): проверка таймстампа для prune по времени.
//! - scratch_name(): случайное имя временного каталога restore/staging.
//! - now_secs(): текущее Unix-время в секундах.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Нормализовать путь относительно корня: убрать ведущие '/' и './',
/// пустые сегменты. Сегменты '..' не схлопываем — их отвергает vfs.
pub fn relpath(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for seg in path.split('/') {
        if seg.is_empty() || seg == "." {
            continue;
        }
        parts.push(seg);
    }
    parts.join("/")
}

/// Возвращает true, если путь содержит '..' (выход за корень).
pub fn escapes_root(path: &str) -> bool {
    path.split('/').any(|seg| seg == "..")
}

/// sha256-хэш относительного пути (hex). Под этим именем живёт каталог
/// снапшотов файла в backup-зоне.
pub fn hash_path(path: &str) -> String {
    let rel = relpath(path);
    let mut hasher = Sha256::new();
    hasher.update(rel.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(64);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

/// Случайное имя scratch-каталога (30 hex-символов).
pub fn scratch_name() -> String {
    let mut bytes = [0u8; 15];
    rand::thread_rng().fill_bytes(&mut bytes);
    let mut out = String::with_capacity(30);
    for b in bytes {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

/// Текущее Unix-время в секундах.
pub fn now_secs() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    now.as_secs().min(i64::MAX as u64) as i64
}

// ---- календарная арифметика (дни <-> civil, алгоритм Хиннанта) ----

fn days_from_civil(y: i64, m: i64, d: i64) -> i64 {
    let y = y - if m <= 2 { 1 } else { 0 };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400; // [0, 399]
    let doy = (153 * (m + if m > 2 { -3 } else { 9 }) + 2) / 5 + d - 1; // [0, 365]
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy; // [0, 146096]
    era * 146097 + doe - 719468
}

fn civil_from_days(z: i64) -> (i64, i64, i64) {
    let z = z + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = z - era * 146097; // [0, 146096]
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365; // [0, 399]
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100); // [0, 365]
    let mp = (5 * doy + 2) / 153; // [0, 11]
    let d = doy - (153 * mp + 2) / 5 + 1; // [1, 31]
    let m = mp + if mp < 10 { 3 } else { -9 }; // [1, 12]
    (y + if m <= 2 { 1 } else { 0 }, m, d)
}

/// Unix-секунды -> '%Y-%m-%dT%H:%M:%S' (UTC).
pub fn format_ts(epoch: i64) -> String {
    let days = epoch.div_euclid(86400);
    let secs = epoch.rem_euclid(86400);
    let (y, m, d) = civil_from_days(days);
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
        y,
        m,
        d,
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    )
}

/// '%Y-%m-%dT%H:%M:%S' (UTC) -> unix-секунды. None при плохом формате.
pub fn parse_ts(s: &str) -> Option<i64> {
    let bytes = s.as_bytes();
    if bytes.len() != 19 || bytes[4] != b'-' || bytes[7] != b'-' || bytes[10] != b'T'
        || bytes[13] != b':' || bytes[16] != b':'
    {
        return None;
    }
    let num = |r: std::ops::Range<usize>| -> Option<i64> { s.get(r)?.parse::<i64>().ok() };
    let (y, m, d) = (num(0..4)?, num(5..7)?, num(8..10)?);
    let (hh, mm, ss) = (num(11..13)?, num(14..16)?, num(17..19)?);
    if !(1..=12).contains(&m) || !(1..=31).contains(&d) {
        return None;
    }
    if !(0..24).contains(&hh) || !(0..60).contains(&mm) || !(0..60).contains(&ss) {
        return None;
    }
    // отвергаем несуществующие даты (31 апреля и т.п.) через roundtrip
    let days = days_from_civil(y, m, d);
    if civil_from_days(days) != (y, m, d) {
        return None;
    }
    Some(days * 86400 + hh * 3600 + mm * 60 + ss)
}

/// Проверка формата таймстампа (для prune по времени).
pub fn is_valid_time_format(s: &str) -> bool {
    parse_ts(s).is_some()
}
