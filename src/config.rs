//! Centralized configuration and builder for verfs.
//!
//! Goals:
//! - Single place to collect tunables instead of scattering env lookups.
//! - VerfsConfig::from_env() reads VERFS_* env vars; VerfsBuilder allows
//!   programmatic overrides on top.
//!
//! Tunables:
//! - backend: which versioning backend to use (rdiff-backup or the
//!   built-in full-copy store).
//! - rdiff_bin: binary name/path for rdiff-backup.
//! - snapshot_max_tries / snapshot_retry_ms: rdiff-backup refuses two
//!   snapshots of the same repository within one second, so a handle
//!   that snapshots on close retries with a delay.
//! - hide_backups: filter the backup/scratch dirs out of listings.
//! - test_clock: forced start time handed to the backend as
//!   --current-time (monotonically bumped per snapshot); lets tests
//!   take many snapshots quickly and deterministically.

use std::fmt;

/// Versioning backend selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    /// Shell out to rdiff-backup (the default).
    Rdiff,
    /// Built-in full-copy store (gzip frames); no external tool needed.
    Copy,
}

impl BackendKind {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rdiff" | "rdiff-backup" => Some(BackendKind::Rdiff),
            "copy" | "builtin" => Some(BackendKind::Copy),
            _ => None,
        }
    }
}

/// Top-level configuration for a VersioningFs instance.
#[derive(Clone, Debug)]
pub struct VerfsConfig {
    /// Which backend to use.
    /// Env: VERFS_BACKEND = rdiff|copy (default rdiff)
    pub backend: BackendKind,

    /// Binary name (or absolute path) of rdiff-backup.
    /// Env: VERFS_RDIFF_BIN (default "rdiff-backup")
    pub rdiff_bin: String,

    /// Attempts for snapshot-on-close before giving up.
    /// Env: VERFS_SNAPSHOT_MAX_TRIES (default 3)
    pub snapshot_max_tries: u32,

    /// Delay between snapshot attempts, in milliseconds.
    /// Env: VERFS_SNAPSHOT_RETRY_MS (default 1000)
    pub snapshot_retry_ms: u64,

    /// Hide the backup/scratch dirs from directory listings.
    /// Env: VERFS_HIDE_BACKUPS = 0|1 (default 1)
    pub hide_backups: bool,

    /// Forced snapshot clock start (unix seconds). None in production.
    /// Env: VERFS_TEST_CLOCK (default unset)
    pub test_clock: Option<i64>,
}

impl Default for VerfsConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Rdiff,
            rdiff_bin: "rdiff-backup".to_string(),
            snapshot_max_tries: 3,
            snapshot_retry_ms: 1000,
            hide_backups: true,
            test_clock: None,
        }
    }
}

impl VerfsConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("VERFS_BACKEND") {
            if let Some(kind) = BackendKind::parse(&v) {
                cfg.backend = kind;
            }
        }

        if let Ok(v) = std::env::var("VERFS_RDIFF_BIN") {
            let s = v.trim();
            if !s.is_empty() {
                cfg.rdiff_bin = s.to_string();
            }
        }

        if let Ok(v) = std::env::var("VERFS_SNAPSHOT_MAX_TRIES") {
            if let Ok(n) = v.trim().parse::<u32>() {
                if n > 0 {
                    cfg.snapshot_max_tries = n;
                }
            }
        }

        if let Ok(v) = std::env::var("VERFS_SNAPSHOT_RETRY_MS") {
            if let Ok(n) = v.trim().parse::<u64>() {
                cfg.snapshot_retry_ms = n;
            }
        }

        if let Ok(v) = std::env::var("VERFS_HIDE_BACKUPS") {
            let s = v.trim().to_ascii_lowercase();
            cfg.hide_backups = !(s == "0" || s == "false" || s == "off" || s == "no");
        }

        if let Ok(v) = std::env::var("VERFS_TEST_CLOCK") {
            if let Ok(n) = v.trim().parse::<i64>() {
                cfg.test_clock = Some(n);
            }
        }

        cfg
    }

    /// Fluent setters (builder-style) to override specific fields.

    pub fn with_backend(mut self, kind: BackendKind) -> Self {
        self.backend = kind;
        self
    }

    pub fn with_rdiff_bin<S: Into<String>>(mut self, bin: S) -> Self {
        self.rdiff_bin = bin.into();
        self
    }

    pub fn with_snapshot_max_tries(mut self, tries: u32) -> Self {
        self.snapshot_max_tries = tries.max(1);
        self
    }

    pub fn with_snapshot_retry_ms(mut self, ms: u64) -> Self {
        self.snapshot_retry_ms = ms;
        self
    }

    pub fn with_hide_backups(mut self, on: bool) -> Self {
        self.hide_backups = on;
        self
    }

    /// Set the forced snapshot clock (tests only).
    pub fn with_test_clock(mut self, start: Option<i64>) -> Self {
        self.test_clock = start;
        self
    }
}

impl fmt::Display for VerfsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VerfsConfig {{ backend: {:?}, rdiff_bin: {}, snapshot_max_tries: {}, \
             snapshot_retry_ms: {}, hide_backups: {}, test_clock: {} }}",
            self.backend,
            self.rdiff_bin,
            self.snapshot_max_tries,
            self.snapshot_retry_ms,
            self.hide_backups,
            self.test_clock
                .map(|v| v.to_string())
                .unwrap_or_else(|| "none".to_string()),
        )
    }
}

/// Lightweight builder that produces a VerfsConfig.
#[derive(Clone, Debug)]
pub struct VerfsBuilder {
    cfg: VerfsConfig,
}

impl Default for VerfsBuilder {
    fn default() -> Self {
        // Start from env, then allow overrides.
        Self {
            cfg: VerfsConfig::from_env(),
        }
    }
}

impl VerfsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a clean default (without reading env).
    pub fn from_default() -> Self {
        Self {
            cfg: VerfsConfig::default(),
        }
    }

    pub fn backend(mut self, kind: BackendKind) -> Self {
        self.cfg.backend = kind;
        self
    }

    pub fn rdiff_bin<S: Into<String>>(mut self, bin: S) -> Self {
        self.cfg.rdiff_bin = bin.into();
        self
    }

    pub fn snapshot_max_tries(mut self, tries: u32) -> Self {
        self.cfg.snapshot_max_tries = tries.max(1);
        self
    }

    pub fn snapshot_retry_ms(mut self, ms: u64) -> Self {
        self.cfg.snapshot_retry_ms = ms;
        self
    }

    pub fn hide_backups(mut self, on: bool) -> Self {
        self.cfg.hide_backups = on;
        self
    }

    pub fn test_clock(mut self, start: Option<i64>) -> Self {
        self.cfg.test_clock = start;
        self
    }

    /// Finish the builder and obtain the configuration.
    pub fn build(self) -> VerfsConfig {
        self.cfg
    }
}
