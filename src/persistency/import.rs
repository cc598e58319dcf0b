//! Filtered, duplicate-safe import of catalog entries into a manager

use serde::Serialize;

use super::catalog::CatalogEntry;
use crate::manager::ConditionsManager;
use crate::observability::{log_event_with_fields, Event};

/// Outcome of one import pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Conditions newly inserted into the manager
    pub imported: usize,
    /// Conditions whose key was already present in the destination pool
    pub duplicates: usize,
    /// Matching entries skipped because their IOV type was unusable
    pub skipped_entries: usize,
}

impl ImportReport {
    /// Adds another pass's counts
    pub fn merge(&mut self, other: ImportReport) {
        self.imported += other.imported;
        self.duplicates += other.duplicates;
        self.skipped_entries += other.skipped_entries;
    }
}

/// Imports every entry matching `identifier` and `iov_type`.
///
/// Each condition is rebound to the destination pool's IOV before insert,
/// whether or not the insert succeeds.
pub(crate) fn import_entries(
    entries: &[CatalogEntry],
    identifier: &str,
    iov_type: &str,
    manager: &mut ConditionsManager,
) -> ImportReport {
    let mut report = ImportReport::default();

    for entry in entries.iter().filter(|e| e.matches(identifier, iov_type)) {
        let registered = match manager.require_iov_type(entry.iov_discriminator, &entry.iov_type_name) {
            Ok(iov_type) => manager.register_iov(&iov_type, entry.interval_key),
            Err(e) => Err(e),
        };
        let pool = match registered {
            Ok(pool) => pool,
            Err(e) => {
                report.skipped_entries += 1;
                let interval = entry.interval_key.to_string();
                log_event_with_fields(
                    Event::ImportEntrySkipped,
                    &[
                        ("code", e.code()),
                        ("identifier", entry.identifier.as_str()),
                        ("interval", interval.as_str()),
                        ("iov_type", entry.iov_type_name.as_str()),
                        ("reason", e.to_string().as_str()),
                    ],
                );
                continue;
            }
        };

        let pool_iov = pool.iov().clone();
        for condition in &entry.conditions {
            condition.rebind_iov(pool_iov.clone());
            if pool.insert(condition.clone()) {
                report.imported += 1;
            } else {
                report.duplicates += 1;
                log_event_with_fields(
                    Event::ImportDuplicate,
                    &[
                        ("condition", condition.name()),
                        ("identifier", identifier),
                        ("iov", pool_iov.to_string().as_str()),
                        ("iov_type", iov_type),
                        ("source", entry.identifier.as_str()),
                    ],
                );
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;
    use crate::iov::{Iov, IovKey};
    use serde_json::json;
    use std::sync::Arc;

    fn entry(identifier: &str, type_name: &str, disc: u32, names: &[&str]) -> CatalogEntry {
        let iov = Arc::new(Iov::detached(disc, type_name, IovKey::new(100, 200).unwrap()));
        let mut entry = CatalogEntry::new(identifier, &iov);
        for name in names {
            entry
                .conditions
                .push(Condition::shared("det", *name, json!(1), iov.clone()));
        }
        entry
    }

    #[test]
    fn test_import_rebinds_to_pool_iov() {
        let entries = vec![entry("batchA", "run", 1, &["a", "b"])];
        let mut manager = ConditionsManager::new();

        let report = import_entries(&entries, "*", "*", &mut manager);
        assert_eq!(report.imported, 2);

        let run = manager.iov_type("run").unwrap();
        let pool = manager.pool(&run, &IovKey::new(100, 200).unwrap()).unwrap();
        for condition in &entries[0].conditions {
            assert!(Arc::ptr_eq(&condition.iov(), pool.iov()));
        }
    }

    #[test]
    fn test_import_filters() {
        let entries = vec![
            entry("batchA", "run", 1, &["a"]),
            entry("batchB", "run", 1, &["b"]),
            entry("batchA", "time", 2, &["c"]),
        ];
        let mut manager = ConditionsManager::new();

        let report = import_entries(&entries, "batchA", "run", &mut manager);
        assert_eq!(report.imported, 1);
        assert_eq!(manager.condition_count(), 1);
        assert!(manager.iov_type("time").is_none());
    }

    #[test]
    fn test_reimport_counts_duplicates() {
        let entries = vec![entry("batchA", "run", 1, &["a", "b", "c"])];
        let mut manager = ConditionsManager::new();

        assert_eq!(import_entries(&entries, "", "", &mut manager).imported, 3);
        let again = import_entries(&entries, "", "", &mut manager);
        assert_eq!(again.imported, 0);
        assert_eq!(again.duplicates, 3);
        assert_eq!(manager.condition_count(), 3);
    }

    #[test]
    fn test_unusable_type_skips_entry() {
        let entries = vec![
            entry("batchA", "run", 1, &["a"]),
            entry("batchA", "time", 1, &["b"]),
        ];
        let mut manager = ConditionsManager::new();

        let report = import_entries(&entries, "*", "*", &mut manager);
        assert_eq!(report.imported, 1);
        assert_eq!(report.skipped_entries, 1);
        assert!(manager.iov_type("time").is_none());
    }

    #[test]
    fn test_existing_type_name_wins_over_stored_discriminator() {
        let entries = vec![entry("batchA", "run", 7, &["a"])];
        let mut manager = ConditionsManager::new();
        manager.register_iov_type(3, "run");

        let report = import_entries(&entries, "*", "*", &mut manager);
        assert_eq!(report.imported, 1);
        assert_eq!(manager.iov_type("run").unwrap().discriminator(), 3);
    }

    #[test]
    fn test_report_merge() {
        let mut total = ImportReport::default();
        total.merge(ImportReport {
            imported: 2,
            duplicates: 1,
            skipped_entries: 0,
        });
        total.merge(ImportReport {
            imported: 1,
            duplicates: 0,
            skipped_entries: 3,
        });
        assert_eq!(
            total,
            ImportReport {
                imported: 3,
                duplicates: 1,
                skipped_entries: 3
            }
        );
    }
}
