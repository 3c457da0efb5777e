//! Typed error kinds for verfs.
//!
//! The library returns anyhow::Result everywhere; these kinds ride inside
//! anyhow::Error so callers can tell apart the cases that matter:
//! - NotFound               — путь не существует (ни live-файла, ни снапшотов)
//! - VersionNotFound        — версия вне диапазона 1..=N
//! - UnsupportedOperation   — запись в versioned-хэндл и т.п.
//! - InvalidVersion         — плохой курсор для prune (ordinal/timestamp)
//! - Backend                — rdiff-backup вернул ошибку (stderr)
//! - BackendUnavailable     — инструмент не установлен / не запускается
//!
//! Use err.downcast_ref::<VerfsError>() to match on a kind.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerfsError {
    /// Path has neither a live file nor any recorded history.
    NotFound(String),
    /// Requested version ordinal is outside 1..=N for this path.
    VersionNotFound { path: String, version: u64 },
    /// Operation is not supported on this handle/path (e.g. writing
    /// through a versioned handle).
    UnsupportedOperation(String),
    /// Invalid version cursor passed to history pruning.
    InvalidVersion(String),
    /// The external versioning tool ran but reported an error.
    Backend(String),
    /// The external versioning tool could not be invoked at all.
    BackendUnavailable(String),
}

impl fmt::Display for VerfsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerfsError::NotFound(p) => write!(f, "path not found: {}", p),
            VerfsError::VersionNotFound { path, version } => {
                write!(f, "version {} not found for {}", version, path)
            }
            VerfsError::UnsupportedOperation(what) => {
                write!(f, "unsupported operation: {}", what)
            }
            VerfsError::InvalidVersion(msg) => write!(f, "invalid version: {}", msg),
            VerfsError::Backend(msg) => write!(f, "versioning backend error: {}", msg),
            VerfsError::BackendUnavailable(msg) => {
                write!(f, "versioning backend unavailable: {}", msg)
            }
        }
    }
}

impl std::error::Error for VerfsError {}

impl VerfsError {
    pub fn not_found(path: impl Into<String>) -> anyhow::Error {
        anyhow::Error::new(VerfsError::NotFound(path.into()))
    }

    pub fn version_not_found(path: impl Into<String>, version: u64) -> anyhow::Error {
        anyhow::Error::new(VerfsError::VersionNotFound {
            path: path.into(),
            version,
        })
    }

    pub fn unsupported(what: impl Into<String>) -> anyhow::Error {
        anyhow::Error::new(VerfsError::UnsupportedOperation(what.into()))
    }

    pub fn invalid_version(msg: impl Into<String>) -> anyhow::Error {
        anyhow::Error::new(VerfsError::InvalidVersion(msg.into()))
    }

    pub fn backend(msg: impl Into<String>) -> anyhow::Error {
        anyhow::Error::new(VerfsError::Backend(msg.into()))
    }

    pub fn backend_unavailable(msg: impl Into<String>) -> anyhow::Error {
        anyhow::Error::new(VerfsError::BackendUnavailable(msg.into()))
    }
}
