//! Persistency counters
//!
//! - Counters only, monotonic
//! - Relaxed atomics; exact totals once writers are quiescent

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters for capture, storage, and import activity
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    conditions_captured: AtomicU64,
    conditions_released: AtomicU64,
    conditions_imported: AtomicU64,
    import_duplicates: AtomicU64,
    entries_skipped: AtomicU64,
    bytes_written: AtomicU64,
    catalogs_saved: AtomicU64,
    save_failures: AtomicU64,
}

impl MetricsRegistry {
    /// Create a registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Conditions referenced by a capture
    pub fn add_captured(&self, count: u64) {
        self.conditions_captured.fetch_add(count, Ordering::Relaxed);
    }

    /// Conditions released by `clear()`
    pub fn add_released(&self, count: u64) {
        self.conditions_released.fetch_add(count, Ordering::Relaxed);
    }

    /// Conditions newly inserted by an import
    pub fn add_imported(&self, count: u64) {
        self.conditions_imported.fetch_add(count, Ordering::Relaxed);
    }

    /// Duplicates dropped during import
    pub fn add_duplicates(&self, count: u64) {
        self.import_duplicates.fetch_add(count, Ordering::Relaxed);
    }

    /// Entries skipped during import
    pub fn add_skipped(&self, count: u64) {
        self.entries_skipped.fetch_add(count, Ordering::Relaxed);
    }

    /// Successful save of `bytes`
    pub fn record_save(&self, bytes: u64) {
        self.catalogs_saved.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Failed save
    pub fn increment_save_failures(&self) {
        self.save_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            conditions_captured: self.conditions_captured.load(Ordering::Relaxed),
            conditions_released: self.conditions_released.load(Ordering::Relaxed),
            conditions_imported: self.conditions_imported.load(Ordering::Relaxed),
            import_duplicates: self.import_duplicates.load(Ordering::Relaxed),
            entries_skipped: self.entries_skipped.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            catalogs_saved: self.catalogs_saved.load(Ordering::Relaxed),
            save_failures: self.save_failures.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of all counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub conditions_captured: u64,
    pub conditions_released: u64,
    pub conditions_imported: u64,
    pub import_duplicates: u64,
    pub entries_skipped: u64,
    pub bytes_written: u64,
    pub catalogs_saved: u64,
    pub save_failures: u64,
}
