//! backend — узкий интерфейс внешнего инструмента версионирования.
//!
//! Разделение по подмодулям:
//! - rdiff.rs — RdiffBackend: вызов rdiff-backup через std::process::Command.
//! - copy.rs  — CopyBackend: встроенное full-copy хранилище (gzip-кадры),
//!              без внешнего инструмента; используется тестами и как
//!              fallback на хостах без rdiff-backup.
//!
//! Контракт узкий намеренно: адаптеру нужны ровно пять операций, всё
//! остальное (диффы, сигнатуры, retention) — собственность инструмента.

use anyhow::Result;
use std::path::{Path, PathBuf};

mod copy;
mod rdiff;

pub use copy::CopyBackend;
pub use rdiff::RdiffBackend;

/// Имя файла данных внутри staging/restore-каталогов. Каждый снапшот
/// бэкапит каталог из одного файла с этим именем.
pub const DATAFILE: &str = "datafile";

/// Параметры, общие для мутирующих операций бэкенда.
#[derive(Debug, Clone)]
pub struct SnapshotOptions {
    /// Scratch-каталог инструмента (--tempdir у rdiff-backup).
    pub tmp_dir: PathBuf,
    /// Принудительное "текущее время" снапшота (тестовые часы).
    pub current_time: Option<i64>,
}

/// Версионирующий бэкенд: инструмент, умеющий записывать и доставать
/// исторические состояния одного файла.
///
/// Версии идентифицируются unix-секундами (stamp) — так их печатает
/// rdiff-backup. Порядковые номера 1..=N поверх отсортированных stamps
/// считает слой vfs, не бэкенд.
pub trait VersionBackend: Send + Sync {
    /// Имя инструмента для логов/диагностики.
    fn tool_name(&self) -> &str;

    /// Записать содержимое src_dir (каталог с одним DATAFILE) как новую
    /// версию в репозиторий snap_dir.
    fn snapshot(&self, src_dir: &Path, snap_dir: &Path, opts: &SnapshotOptions) -> Result<()>;

    /// Stamps записанных версий по возрастанию. Пусто, если репозитория нет.
    fn list_versions(&self, snap_dir: &Path) -> Result<Vec<i64>>;

    /// Материализовать версию stamp в dest_dir (каталог создаётся).
    /// Возвращает путь к восстановленному DATAFILE.
    fn restore(&self, snap_dir: &Path, stamp: i64, dest_dir: &Path) -> Result<PathBuf>;

    /// Человекочитаемые размеры инкрементов, от старшего (oldest) к
    /// новому. Пусто, если репозитория нет.
    fn increment_sizes(&self, snap_dir: &Path) -> Result<Vec<String>>;

    /// Удалить версии строго старше cutoff. Cutoff — либо unix-секунды
    /// строкой, либо '%Y-%m-%dT%H:%M:%S' (то, что понимает
    /// rdiff-backup --remove-older-than).
    fn remove_older_than(&self, snap_dir: &Path, cutoff: &str, opts: &SnapshotOptions)
        -> Result<()>;
}
