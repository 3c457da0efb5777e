// Базовые модули
pub mod config;
pub mod errors;
pub mod metrics;

// Модульная раскладка (папки с mod.rs)
pub mod backend; // src/backend/{mod,rdiff,copy}.rs
pub mod vfs;     // src/vfs/{mod,open,handle,snapshot,info,ops,hide}.rs

// Утилиты (hash_path, format_ts, ...)
pub mod util; // src/util/mod.rs

// Локи на каталог бэкапов
pub mod lock;

// Удобные реэкспорты
pub use config::{BackendKind, VerfsBuilder, VerfsConfig};
pub use errors::VerfsError;
pub use vfs::{OpenMode, OpenOpts, VersionCutoff, VersionedFile, VersioningFs};

// Реэкспорты backend API (для внешних реализаций)
pub use backend::{CopyBackend, RdiffBackend, SnapshotOptions, VersionBackend};
