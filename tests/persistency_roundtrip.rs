//! Persistency Round-Trip Tests
//!
//! Capture pools into a catalog, save it to a container, load it back, and
//! import it into a fresh manager:
//! - Every captured condition arrives in the pool of its original interval
//! - Filters select entries by identifier and IOV type name
//! - Re-importing the same catalog inserts nothing

use std::sync::Arc;

use condstore::condition::Condition;
use condstore::iov::{Iov, IovKey, IovType};
use condstore::manager::ConditionsManager;
use condstore::persistency::{CatalogKind, ConditionsPersistency};
use serde_json::json;
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

fn key(low: i64, high: i64) -> IovKey {
    IovKey::new(low, high).unwrap()
}

/// Registers `type_name` and fills the pool at `(low, high)` with one
/// condition per detector.
fn populate(
    manager: &mut ConditionsManager,
    disc: u32,
    type_name: &str,
    interval: IovKey,
    detectors: &[&str],
) -> Arc<IovType> {
    let (_, iov_type) = manager.register_iov_type(disc, type_name);
    let iov_type = iov_type.unwrap();
    let pool = manager.register_iov(&iov_type, interval).unwrap();
    let iov = pool.iov().clone();
    for detector in detectors {
        let payload = json!({ "detector": detector, "value": 1.5 });
        assert!(pool.insert(Condition::shared(*detector, "alignment", payload, iov.clone())));
    }
    iov_type
}

fn save_and_reload(catalog: &ConditionsPersistency, dir: &TempDir) -> ConditionsPersistency {
    let path = dir.path().join("conditions.dat");
    assert!(catalog.save_to_path(&path) > 0);

    let storage = ConditionsPersistency::open_storage(&path).unwrap();
    ConditionsPersistency::load(&storage, catalog.name()).unwrap()
}

// =============================================================================
// Worked Example
// =============================================================================

#[test]
fn test_pool_capture_save_load_import() {
    let dir = TempDir::new().unwrap();
    let mut source = ConditionsManager::new();
    let run = populate(&mut source, 1, "run", key(100, 200), &["A", "B", "C"]);

    let mut catalog = ConditionsPersistency::new("Conditions", "calibration batch");
    let captured = catalog.add_pool("batchA", source.pool(&run, &key(100, 200)).unwrap());
    assert_eq!(captured, 3);

    let loaded = save_and_reload(&catalog, &dir);
    assert_eq!(loaded.name(), "Conditions");
    assert_eq!(loaded.title(), "calibration batch");
    assert_eq!(loaded.created_at(), catalog.created_at());
    assert_eq!(loaded.entries(CatalogKind::ConditionPools).len(), 1);
    assert!(loaded.duration() >= 0.0);

    let mut target = ConditionsManager::new();
    assert_eq!(loaded.import_conditions_pool("batchA", "run", &mut target), 3);

    let run = target.iov_type("run").unwrap();
    assert_eq!(run.discriminator(), 1);
    let pool = target.pool(&run, &key(100, 200)).unwrap();
    assert_eq!(pool.len(), 3);

    let detectors: Vec<&str> = pool.iter().map(|c| c.detector()).collect();
    assert_eq!(detectors, vec!["A", "B", "C"]);
    for condition in pool.iter() {
        assert!(Arc::ptr_eq(&condition.iov(), pool.iov()));
        assert_eq!(condition.payload()["value"], 1.5);
    }
}

#[test]
fn test_reimport_yields_duplicates_only() {
    let dir = TempDir::new().unwrap();
    let mut source = ConditionsManager::new();
    let run = populate(&mut source, 1, "run", key(100, 200), &["A", "B", "C"]);

    let mut catalog = ConditionsPersistency::new("Conditions", "");
    catalog.add_pool("batchA", source.pool(&run, &key(100, 200)).unwrap());
    let loaded = save_and_reload(&catalog, &dir);

    let mut target = ConditionsManager::new();
    let first = loaded.import(CatalogKind::ConditionPools, "batchA", "run", &mut target);
    assert_eq!(first.imported, 3);
    assert_eq!(first.duplicates, 0);

    let second = loaded.import(CatalogKind::ConditionPools, "batchA", "run", &mut target);
    assert_eq!(second.imported, 0);
    assert_eq!(second.duplicates, 3);
    assert_eq!(target.condition_count(), 3);
}

#[test]
fn test_import_into_source_manager_is_all_duplicates() {
    let mut source = ConditionsManager::new();
    let run = populate(&mut source, 1, "run", key(100, 200), &["A", "B"]);

    let mut catalog = ConditionsPersistency::new("Conditions", "");
    catalog.add_pool("batchA", source.pool(&run, &key(100, 200)).unwrap());

    assert_eq!(catalog.import_conditions_pool("*", "*", &mut source), 0);
    assert_eq!(source.condition_count(), 2);
}

// =============================================================================
// Filters
// =============================================================================

#[test]
fn test_wildcards_match_every_entry() {
    let dir = TempDir::new().unwrap();
    let mut source = ConditionsManager::new();
    let run = populate(&mut source, 1, "run", key(100, 200), &["A"]);
    let time = populate(&mut source, 2, "time", key(0, 50), &["B", "C"]);

    let mut catalog = ConditionsPersistency::new("Conditions", "");
    catalog.add_pool("batchA", source.pool(&run, &key(100, 200)).unwrap());
    catalog.add_pool("batchB", source.pool(&time, &key(0, 50)).unwrap());
    let loaded = save_and_reload(&catalog, &dir);

    let mut empty_filters = ConditionsManager::new();
    assert_eq!(loaded.import_conditions_pool("", "", &mut empty_filters), 3);

    let mut star_filters = ConditionsManager::new();
    assert_eq!(loaded.import_conditions_pool("*", "*", &mut star_filters), 3);
}

#[test]
fn test_filters_are_exact() {
    let dir = TempDir::new().unwrap();
    let mut source = ConditionsManager::new();
    let run = populate(&mut source, 1, "run", key(100, 200), &["A"]);
    let time = populate(&mut source, 2, "time", key(0, 50), &["B", "C"]);

    let mut catalog = ConditionsPersistency::new("Conditions", "");
    catalog.add_pool("batchA", source.pool(&run, &key(100, 200)).unwrap());
    catalog.add_pool("batchB", source.pool(&time, &key(0, 50)).unwrap());
    let loaded = save_and_reload(&catalog, &dir);

    let mut by_identifier = ConditionsManager::new();
    assert_eq!(loaded.import_conditions_pool("batchB", "*", &mut by_identifier), 2);
    assert!(by_identifier.iov_type("run").is_none());

    let mut by_type = ConditionsManager::new();
    assert_eq!(loaded.import_conditions_pool("*", "run", &mut by_type), 1);
    assert!(by_type.iov_type("time").is_none());

    let mut no_match = ConditionsManager::new();
    assert_eq!(loaded.import_conditions_pool("batch", "*", &mut no_match), 0);
    assert_eq!(no_match.iov_types().count(), 0);
}

// =============================================================================
// IOV Pools and User Pools
// =============================================================================

#[test]
fn test_iov_pool_capture_restores_every_interval() {
    let dir = TempDir::new().unwrap();
    let mut source = ConditionsManager::new();
    let run = populate(&mut source, 1, "run", key(100, 200), &["A", "B"]);
    populate(&mut source, 1, "run", key(201, 300), &["C"]);

    let mut catalog = ConditionsPersistency::new("Conditions", "");
    let captured = catalog.add_iov_pool("runs", source.iov_pool(&run).unwrap());
    assert_eq!(captured, 3);
    assert_eq!(catalog.entries(CatalogKind::IovPools).len(), 2);

    let loaded = save_and_reload(&catalog, &dir);
    let mut target = ConditionsManager::new();
    assert_eq!(loaded.import_iov_pool("runs", "run", &mut target), 3);

    let run = target.iov_type("run").unwrap();
    let keys: Vec<IovKey> = target
        .iov_pool(&run)
        .unwrap()
        .elements()
        .map(|(k, _)| *k)
        .collect();
    assert_eq!(keys, vec![key(100, 200), key(201, 300)]);
    assert_eq!(target.pool(&run, &key(201, 300)).unwrap().len(), 1);
}

#[test]
fn test_user_pool_capture_keyed_by_validity() {
    let dir = TempDir::new().unwrap();
    let mut source = ConditionsManager::new();
    let run = populate(&mut source, 1, "run", key(100, 200), &["A", "B"]);
    populate(&mut source, 1, "run", key(300, 400), &["C"]);

    let required = Iov::new(run.clone(), IovKey::point(150));
    let user_pool = source.prepare(&required).unwrap();
    assert_eq!(user_pool.len(), 2);

    let mut catalog = ConditionsPersistency::new("Conditions", "");
    assert_eq!(catalog.add_user_pool("event", &user_pool), 2);

    let loaded = save_and_reload(&catalog, &dir);
    let entry = &loaded.entries(CatalogKind::UserPools)[0];
    assert_eq!(entry.interval_key, key(100, 200));

    let mut target = ConditionsManager::new();
    assert_eq!(loaded.import_user_pool("event", "run", &mut target), 2);
    let run = target.iov_type("run").unwrap();
    assert_eq!(target.pool(&run, &key(100, 200)).unwrap().len(), 2);
}

#[test]
fn test_collections_are_independent() {
    let mut source = ConditionsManager::new();
    let run = populate(&mut source, 1, "run", key(100, 200), &["A"]);

    let mut catalog = ConditionsPersistency::new("Conditions", "");
    catalog.add_pool("batchA", source.pool(&run, &key(100, 200)).unwrap());

    let mut target = ConditionsManager::new();
    assert_eq!(catalog.import_iov_pool("*", "*", &mut target), 0);
    assert_eq!(catalog.import_user_pool("*", "*", &mut target), 0);
    assert_eq!(catalog.import_conditions_pool("*", "*", &mut target), 1);
}

#[test]
fn test_condition_keys_survive_round_trip() {
    let dir = TempDir::new().unwrap();
    let mut source = ConditionsManager::new();
    let run = populate(&mut source, 1, "run", key(100, 200), &["A", "B"]);

    let mut catalog = ConditionsPersistency::new("Conditions", "");
    catalog.add_pool("batchA", source.pool(&run, &key(100, 200)).unwrap());
    let loaded = save_and_reload(&catalog, &dir);

    let original: Vec<_> = catalog.entries(CatalogKind::ConditionPools)[0]
        .conditions
        .iter()
        .map(|c| c.key())
        .collect();
    let restored: Vec<_> = loaded.entries(CatalogKind::ConditionPools)[0]
        .conditions
        .iter()
        .map(|c| c.key())
        .collect();
    assert_eq!(original, restored);
}
