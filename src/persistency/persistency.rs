//! Named, timestamped catalog of captured pools

use std::borrow::Cow;
use std::path::Path;

use chrono::Utc;
use serde::Serialize;

use super::catalog::{CatalogEntry, CatalogKind};
use super::import::{import_entries, ImportReport};
use super::wire::{borrow_entries, into_entries, PersistentCatalog};
use crate::manager::ConditionsManager;
use crate::observability::{
    log_event_with_fields, DurationCell, DurationStamp, Event, MetricsRegistry, MetricsSnapshot,
    ObservationScope,
};
use crate::pool::{ConditionsIovPool, ConditionsPool, UserPool};
use crate::storage::{ConditionsStorage, StorageResult};

/// A catalog of conditions snapshots.
///
/// Capture holds one strong reference per captured condition until
/// `clear()` or drop. Mutation needs `&mut self`; import and save only read
/// the catalog.
#[derive(Debug)]
pub struct ConditionsPersistency {
    name: String,
    title: String,
    created_at: String,
    condition_pools: Vec<CatalogEntry>,
    iov_pools: Vec<CatalogEntry>,
    user_pools: Vec<CatalogEntry>,
    duration: DurationCell,
    metrics: MetricsRegistry,
}

/// Per-collection counts, as printed by `condstore inspect`
#[derive(Debug, Clone, Serialize)]
pub struct CollectionSummary {
    pub collection: &'static str,
    pub entries: usize,
    pub conditions: usize,
}

/// Catalog overview
#[derive(Debug, Clone, Serialize)]
pub struct CatalogSummary {
    pub name: String,
    pub title: String,
    pub created_at: String,
    pub duration: f64,
    pub collections: Vec<CollectionSummary>,
    pub metrics: MetricsSnapshot,
}

impl ConditionsPersistency {
    /// Creates an empty catalog stamped with the current time
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            created_at: Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            condition_pools: Vec::new(),
            iov_pools: Vec::new(),
            user_pools: Vec::new(),
            duration: DurationCell::default(),
            metrics: MetricsRegistry::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Creation time, `YYYY-MM-DDTHH:MM:SSZ`
    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    /// Seconds taken by the most recent timed operation
    pub fn duration(&self) -> f64 {
        self.duration.get()
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// Entries of one collection, in capture order
    pub fn entries(&self, kind: CatalogKind) -> &[CatalogEntry] {
        match kind {
            CatalogKind::ConditionPools => &self.condition_pools,
            CatalogKind::IovPools => &self.iov_pools,
            CatalogKind::UserPools => &self.user_pools,
        }
    }

    /// Captured conditions across all collections, duplicates included
    pub fn condition_count(&self) -> usize {
        CatalogKind::ALL
            .into_iter()
            .flat_map(|kind| self.entries(kind))
            .map(CatalogEntry::len)
            .sum()
    }

    /// True if no collection holds an entry
    pub fn is_empty(&self) -> bool {
        self.condition_pools.is_empty() && self.iov_pools.is_empty() && self.user_pools.is_empty()
    }

    /// Captures every member of `pool` under `identifier`.
    ///
    /// Returns the number of conditions captured.
    pub fn add_pool(&mut self, identifier: &str, pool: &ConditionsPool) -> usize {
        let _stamp = DurationStamp::new(&self.duration);
        let mut entry = CatalogEntry::new(identifier, pool.iov());
        pool.select_all(&mut entry.conditions);
        let count = entry.len();
        self.condition_pools.push(entry);

        self.record_capture(Event::CapturePool, identifier, count);
        count
    }

    /// Captures each interval of `pool` as its own entry.
    ///
    /// Returns the total number of conditions captured.
    pub fn add_iov_pool(&mut self, identifier: &str, pool: &ConditionsIovPool) -> usize {
        let _stamp = DurationStamp::new(&self.duration);
        let mut count = 0;
        for (key, element) in pool.elements() {
            let mut entry = CatalogEntry::with_key(identifier, element.iov(), *key);
            element.select_all(&mut entry.conditions);
            count += entry.len();
            self.iov_pools.push(entry);
        }

        self.record_capture(Event::CaptureIovPool, identifier, count);
        count
    }

    /// Captures the members of a user pool, keyed by its validity.
    ///
    /// Returns the number of conditions captured.
    pub fn add_user_pool(&mut self, identifier: &str, pool: &UserPool) -> usize {
        let _stamp = DurationStamp::new(&self.duration);
        let mut entry = CatalogEntry::new(identifier, pool.validity());
        let count = pool.scan(|condition| entry.conditions.push(condition.clone()));
        self.user_pools.push(entry);

        self.record_capture(Event::CaptureUserPool, identifier, count);
        count
    }

    /// Releases every captured reference and empties all collections
    pub fn clear(&mut self) {
        let released = self.condition_count();
        self.condition_pools.clear();
        self.iov_pools.clear();
        self.user_pools.clear();

        if released > 0 {
            self.metrics.add_released(released as u64);
            let released = released.to_string();
            log_event_with_fields(
                Event::CatalogCleared,
                &[("object", self.name.as_str()), ("released", released.as_str())],
            );
        }
    }

    /// Writes the catalog as one object named after it.
    ///
    /// Returns the bytes written.
    pub fn save(&self, storage: &mut ConditionsStorage) -> StorageResult<usize> {
        let _stamp = DurationStamp::new(&self.duration);
        let path = storage.path().display().to_string();
        let scope = ObservationScope::with_fields(
            "CATALOG_SAVE",
            &[("object", self.name.as_str()), ("path", path.as_str())],
        );

        match storage.write_object(&self.name, &self.to_persistent()) {
            Ok(bytes) => {
                self.metrics.record_save(bytes as u64);
                let written = bytes.to_string();
                scope.complete_with_fields(&[("bytes", written.as_str())]);
                Ok(bytes)
            }
            Err(e) => {
                self.metrics.increment_save_failures();
                scope.fail(&e.to_string());
                Err(e)
            }
        }
    }

    /// Saves into a freshly created container at `path`.
    ///
    /// Returns the bytes written, or `-1` if the container cannot be
    /// created or written.
    pub fn save_to_path(&self, path: &Path) -> i64 {
        let _stamp = DurationStamp::new(&self.duration);
        let display = path.display().to_string();

        let mut storage = match ConditionsStorage::create(path) {
            Ok(storage) => storage,
            Err(e) => {
                self.metrics.increment_save_failures();
                log_event_with_fields(
                    Event::CatalogSaveFailed,
                    &[
                        ("object", self.name.as_str()),
                        ("path", display.as_str()),
                        ("reason", e.to_string().as_str()),
                    ],
                );
                return -1;
            }
        };

        let saved = self.save(&mut storage);
        match saved.and_then(|bytes| storage.close().map(|_| bytes)) {
            Ok(bytes) => bytes as i64,
            Err(e) => {
                log_event_with_fields(
                    Event::CatalogSaveFailed,
                    &[
                        ("object", self.name.as_str()),
                        ("path", display.as_str()),
                        ("reason", e.to_string().as_str()),
                    ],
                );
                -1
            }
        }
    }

    /// Opens an existing container for reading.
    ///
    /// # Errors
    ///
    /// FATAL `COND_STORAGE_OPEN_FAILED` for a missing or corrupt container.
    pub fn open_storage(path: &Path) -> StorageResult<ConditionsStorage> {
        let display = path.display().to_string();
        match ConditionsStorage::open(path) {
            Ok(storage) => {
                let objects = storage.object_names().len().to_string();
                log_event_with_fields(
                    Event::StorageOpened,
                    &[("objects", objects.as_str()), ("path", display.as_str())],
                );
                Ok(storage)
            }
            Err(e) => {
                log_event_with_fields(
                    Event::StorageOpenFailed,
                    &[("path", display.as_str()), ("reason", e.to_string().as_str())],
                );
                Err(e)
            }
        }
    }

    /// Loads the catalog stored as `object_name`.
    ///
    /// Loaded conditions are bound to detached IOVs until imported. The
    /// returned catalog's `duration` is the cost of the load.
    ///
    /// # Errors
    ///
    /// - `COND_OBJECT_NOT_FOUND` if no such object exists
    /// - `COND_STORAGE_CORRUPTION` if the object does not decode
    pub fn load(storage: &ConditionsStorage, object_name: &str) -> StorageResult<Self> {
        let duration = DurationCell::default();
        let path = storage.path().display().to_string();
        let scope = ObservationScope::with_fields(
            "CATALOG_LOAD",
            &[("object", object_name), ("path", path.as_str())],
        );

        let loaded = {
            let _stamp = DurationStamp::new(&duration);
            storage
                .read_object::<PersistentCatalog<'static>>(object_name)
                .map(Self::from_persistent)
        };

        match loaded {
            Ok(catalog) => {
                catalog.duration.set(duration.get());
                let conditions = catalog.condition_count().to_string();
                scope.complete_with_fields(&[("conditions", conditions.as_str())]);
                Ok(catalog)
            }
            Err(e) => {
                scope.fail_fatal(&e.to_string());
                Err(e)
            }
        }
    }

    /// Imports matching single-pool captures. Returns the number inserted.
    pub fn import_conditions_pool(
        &self,
        identifier: &str,
        iov_type: &str,
        manager: &mut ConditionsManager,
    ) -> usize {
        self.import(CatalogKind::ConditionPools, identifier, iov_type, manager)
            .imported
    }

    /// Imports matching IOV-pool captures. Returns the number inserted.
    pub fn import_iov_pool(
        &self,
        identifier: &str,
        iov_type: &str,
        manager: &mut ConditionsManager,
    ) -> usize {
        self.import(CatalogKind::IovPools, identifier, iov_type, manager)
            .imported
    }

    /// Imports matching user-pool captures. Returns the number inserted.
    pub fn import_user_pool(
        &self,
        identifier: &str,
        iov_type: &str,
        manager: &mut ConditionsManager,
    ) -> usize {
        self.import(CatalogKind::UserPools, identifier, iov_type, manager)
            .imported
    }

    /// Imports the entries of one collection that match both filters.
    ///
    /// `""` and `"*"` match every identifier or type name. Conditions already
    /// present in the destination pool are counted as duplicates and left
    /// untouched there.
    pub fn import(
        &self,
        kind: CatalogKind,
        identifier: &str,
        iov_type: &str,
        manager: &mut ConditionsManager,
    ) -> ImportReport {
        let _stamp = DurationStamp::new(&self.duration);
        let report = import_entries(self.entries(kind), identifier, iov_type, manager);

        self.metrics.add_imported(report.imported as u64);
        self.metrics.add_duplicates(report.duplicates as u64);
        self.metrics.add_skipped(report.skipped_entries as u64);

        let imported = report.imported.to_string();
        let duplicates = report.duplicates.to_string();
        let skipped = report.skipped_entries.to_string();
        log_event_with_fields(
            Event::ImportComplete,
            &[
                ("collection", kind.as_str()),
                ("duplicates", duplicates.as_str()),
                ("identifier", identifier),
                ("imported", imported.as_str()),
                ("iov_type", iov_type),
                ("object", self.name.as_str()),
                ("skipped_entries", skipped.as_str()),
            ],
        );
        report
    }

    /// Entry and condition counts per collection
    pub fn summary(&self) -> CatalogSummary {
        CatalogSummary {
            name: self.name.clone(),
            title: self.title.clone(),
            created_at: self.created_at.clone(),
            duration: self.duration(),
            collections: CatalogKind::ALL
                .into_iter()
                .map(|kind| CollectionSummary {
                    collection: kind.as_str(),
                    entries: self.entries(kind).len(),
                    conditions: self.entries(kind).iter().map(CatalogEntry::len).sum(),
                })
                .collect(),
            metrics: self.metrics.snapshot(),
        }
    }

    fn record_capture(&self, event: Event, identifier: &str, count: usize) {
        self.metrics.add_captured(count as u64);
        let count = count.to_string();
        log_event_with_fields(
            event,
            &[
                ("conditions", count.as_str()),
                ("identifier", identifier),
                ("object", self.name.as_str()),
            ],
        );
    }

    fn to_persistent(&self) -> PersistentCatalog<'_> {
        PersistentCatalog {
            name: Cow::Borrowed(&self.name),
            title: Cow::Borrowed(&self.title),
            created_at: Cow::Borrowed(&self.created_at),
            condition_pools: borrow_entries(&self.condition_pools),
            iov_pools: borrow_entries(&self.iov_pools),
            user_pools: borrow_entries(&self.user_pools),
            duration: self.duration(),
        }
    }

    fn from_persistent(stored: PersistentCatalog<'static>) -> Self {
        Self {
            name: stored.name.into_owned(),
            title: stored.title.into_owned(),
            created_at: stored.created_at.into_owned(),
            condition_pools: into_entries(stored.condition_pools),
            iov_pools: into_entries(stored.iov_pools),
            user_pools: into_entries(stored.user_pools),
            duration: DurationCell::new(stored.duration),
            metrics: MetricsRegistry::new(),
        }
    }
}

impl Drop for ConditionsPersistency {
    fn drop(&mut self) {
        self.clear();
    }
}
