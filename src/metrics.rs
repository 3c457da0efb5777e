//! Lightweight global metrics for verfs.
//!
//! Потокобезопасные атомарные счётчики для подсистем:
//! - Snapshots (taken / retried / failed)
//! - Restore (count / bytes)
//! - Version listings
//! - Backend errors
//! - Prune runs

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

// ----- Snapshots -----
static SNAPSHOTS_TAKEN: AtomicU64 = AtomicU64::new(0);
static SNAPSHOT_RETRIES: AtomicU64 = AtomicU64::new(0);
static SNAPSHOT_FAILURES: AtomicU64 = AtomicU64::new(0);

// ----- Restore -----
static RESTORES_TOTAL: AtomicU64 = AtomicU64::new(0);
static RESTORE_BYTES: AtomicU64 = AtomicU64::new(0);

// ----- Listings / errors / prune -----
static VERSION_LISTINGS: AtomicU64 = AtomicU64::new(0);
static BACKEND_ERRORS: AtomicU64 = AtomicU64::new(0);
static PRUNE_RUNS: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsSnapshot {
    pub snapshots_taken: u64,
    pub snapshot_retries: u64,
    pub snapshot_failures: u64,

    pub restores_total: u64,
    pub restore_bytes: u64,

    pub version_listings: u64,
    pub backend_errors: u64,
    pub prune_runs: u64,
}

impl MetricsSnapshot {
    pub fn avg_restore_bytes(&self) -> f64 {
        if self.restores_total == 0 {
            0.0
        } else {
            self.restore_bytes as f64 / self.restores_total as f64
        }
    }
}

// ----- Recorders -----

pub fn record_snapshot_taken() {
    SNAPSHOTS_TAKEN.fetch_add(1, Ordering::Relaxed);
}

pub fn record_snapshot_retry() {
    SNAPSHOT_RETRIES.fetch_add(1, Ordering::Relaxed);
}

pub fn record_snapshot_failure() {
    SNAPSHOT_FAILURES.fetch_add(1, Ordering::Relaxed);
}

pub fn record_restore(bytes: u64) {
    RESTORES_TOTAL.fetch_add(1, Ordering::Relaxed);
    RESTORE_BYTES.fetch_add(bytes, Ordering::Relaxed);
}

pub fn record_version_listing() {
    VERSION_LISTINGS.fetch_add(1, Ordering::Relaxed);
}

pub fn record_backend_error() {
    BACKEND_ERRORS.fetch_add(1, Ordering::Relaxed);
}

pub fn record_prune_run() {
    PRUNE_RUNS.fetch_add(1, Ordering::Relaxed);
}

/// Собрать согласованный (по Relaxed-чтению) снимок счётчиков.
pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        snapshots_taken: SNAPSHOTS_TAKEN.load(Ordering::Relaxed),
        snapshot_retries: SNAPSHOT_RETRIES.load(Ordering::Relaxed),
        snapshot_failures: SNAPSHOT_FAILURES.load(Ordering::Relaxed),
        restores_total: RESTORES_TOTAL.load(Ordering::Relaxed),
        restore_bytes: RESTORE_BYTES.load(Ordering::Relaxed),
        version_listings: VERSION_LISTINGS.load(Ordering::Relaxed),
        backend_errors: BACKEND_ERRORS.load(Ordering::Relaxed),
        prune_runs: PRUNE_RUNS.load(Ordering::Relaxed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let before = snapshot();
        record_snapshot_taken();
        record_restore(100);
        record_restore(300);
        let after = snapshot();
        assert!(after.snapshots_taken >= before.snapshots_taken + 1);
        assert!(after.restores_total >= before.restores_total + 2);
        assert!(after.restore_bytes >= before.restore_bytes + 400);
    }

    #[test]
    fn avg_restore_bytes_zero_safe() {
        let m = MetricsSnapshot::default();
        assert_eq!(m.avg_restore_bytes(), 0.0);
    }
}
