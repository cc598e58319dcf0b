//! Conditions Manager
//!
//! Single mutation gateway into the live store.
//!
//! # API
//!
//! - `register_iov_type(discriminator, name)` - Get-or-create an IOV type
//! - `register_iov(iov_type, key)` - Get-or-create the pool for an interval
//! - `insert(condition)` - Insert into the pool of the condition's IOV
//! - `prepare(iov)` - Materialize the user pool active for an interval

use std::sync::Arc;

use super::errors::{ManagerError, ManagerResult};
use crate::condition::ConditionRef;
use crate::iov::{Iov, IovKey, IovType, MAX_IOV_TYPES};
use crate::observability::Logger;
use crate::pool::{ConditionsIovPool, ConditionsPool, UserPool};

/// Owner of the IOV type registry and of every conditions pool.
///
/// Each manager carries its own registry; there is no process-wide state.
/// Mutation requires `&mut self`, so concurrent writers must synchronize
/// externally.
#[derive(Debug)]
pub struct ConditionsManager {
    /// Registered types, indexed by discriminator
    iov_types: Vec<Option<Arc<IovType>>>,
    /// Pools per type, indexed by discriminator
    iov_pools: Vec<Option<ConditionsIovPool>>,
}

impl Default for ConditionsManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConditionsManager {
    /// Creates a manager with an empty registry
    pub fn new() -> Self {
        let slots = MAX_IOV_TYPES as usize;
        Self {
            iov_types: vec![None; slots],
            iov_pools: (0..slots).map(|_| None).collect(),
        }
    }

    /// Registers an IOV type, keyed by name.
    ///
    /// Returns `(true, Some(type))` when created, `(false, Some(existing))`
    /// when a type of that name already exists, and `(false, None)` when the
    /// discriminator is out of range or already owned by another name.
    pub fn register_iov_type(
        &mut self,
        discriminator: u32,
        name: &str,
    ) -> (bool, Option<Arc<IovType>>) {
        if let Some(existing) = self.iov_type(name) {
            return (false, Some(existing));
        }

        let disc = discriminator.to_string();
        if discriminator >= MAX_IOV_TYPES {
            Logger::warn(
                "IOV_TYPE_REJECTED",
                &[
                    ("discriminator", disc.as_str()),
                    ("name", name),
                    ("reason", "discriminator out of range"),
                ],
            );
            return (false, None);
        }

        let slot = discriminator as usize;
        if let Some(owner) = &self.iov_types[slot] {
            Logger::warn(
                "IOV_TYPE_REJECTED",
                &[
                    ("discriminator", disc.as_str()),
                    ("name", name),
                    ("owner", owner.name()),
                    ("reason", "discriminator already registered"),
                ],
            );
            return (false, None);
        }

        let iov_type = Arc::new(IovType::new(discriminator, name));
        self.iov_types[slot] = Some(iov_type.clone());
        self.iov_pools[slot] = Some(ConditionsIovPool::new(iov_type.clone()));
        Logger::trace("IOV_TYPE_REGISTERED", &[("discriminator", disc.as_str()), ("name", name)]);
        (true, Some(iov_type))
    }

    /// Like `register_iov_type`, but an unusable type is an error
    pub fn require_iov_type(
        &mut self,
        discriminator: u32,
        name: &str,
    ) -> ManagerResult<Arc<IovType>> {
        self.register_iov_type(discriminator, name)
            .1
            .ok_or_else(|| ManagerError::UnusableIovType {
                name: name.to_string(),
                discriminator,
            })
    }

    /// Looks up a registered type by name
    pub fn iov_type(&self, name: &str) -> Option<Arc<IovType>> {
        self.iov_types
            .iter()
            .flatten()
            .find(|t| t.name() == name)
            .cloned()
    }

    /// Iterates registered types in discriminator order
    pub fn iov_types(&self) -> impl Iterator<Item = &Arc<IovType>> {
        self.iov_types.iter().flatten()
    }

    /// Returns the pool for `(iov_type, key)`, creating it on first use.
    ///
    /// Two calls with the same type and key return the same pool.
    pub fn register_iov(
        &mut self,
        iov_type: &IovType,
        key: IovKey,
    ) -> ManagerResult<&mut ConditionsPool> {
        let slot = self.slot_of(iov_type)?;
        self.iov_pools[slot]
            .as_mut()
            .map(|pool| pool.get_or_create(key))
            .ok_or_else(|| ManagerError::UnknownIovType(iov_type.name().to_string()))
    }

    /// The pool of every interval of one type
    pub fn iov_pool(&self, iov_type: &IovType) -> Option<&ConditionsIovPool> {
        let slot = self.slot_of(iov_type).ok()?;
        self.iov_pools[slot].as_ref()
    }

    /// The pool for an exact `(type, key)`, if it exists
    pub fn pool(&self, iov_type: &IovType, key: &IovKey) -> Option<&ConditionsPool> {
        self.iov_pool(iov_type)?.get(key)
    }

    /// Inserts a condition into the pool of its current IOV.
    ///
    /// The pool is created if needed. Returns `Ok(false)` on duplicate.
    pub fn insert(&mut self, condition: ConditionRef) -> ManagerResult<bool> {
        let iov = condition.iov();
        let pool = self.register_iov(iov.iov_type(), iov.key())?;
        Ok(pool.insert(condition))
    }

    /// Materializes the conditions active for `required`.
    ///
    /// Every pool of the required type whose key contains `required` donates
    /// its members; on key collisions the earliest registered pool wins. The
    /// validity is the intersection of the contributing pools' keys.
    pub fn prepare(&self, required: &Iov) -> ManagerResult<UserPool> {
        let iov_pool = self
            .iov_pool(required.iov_type())
            .ok_or_else(|| ManagerError::UnknownIovType(required.type_name().to_string()))?;

        let target = required.key();
        let mut validity = IovKey::unbounded();
        let mut contributing = Vec::new();

        for (key, pool) in iov_pool.elements() {
            if !pool.iov().contains(required) {
                continue;
            }
            // Containing keys always overlap `target`, so this never empties.
            validity = validity.intersect(key).unwrap_or(target);
            contributing.push(pool);
        }

        if contributing.is_empty() {
            validity = target;
        }

        let mut user_pool = UserPool::new(Iov::new(iov_pool.iov_type().clone(), validity));
        for pool in contributing {
            for condition in pool.iter() {
                user_pool.insert(condition.clone());
            }
        }
        Ok(user_pool)
    }

    /// Total conditions across all pools
    pub fn condition_count(&self) -> usize {
        self.iov_pools
            .iter()
            .flatten()
            .map(|pool| pool.condition_count())
            .sum()
    }

    /// Resolves the registry slot of a type, matching name and discriminator
    fn slot_of(&self, iov_type: &IovType) -> ManagerResult<usize> {
        let slot = iov_type.discriminator() as usize;
        match self.iov_types.get(slot) {
            Some(Some(registered)) if registered.name() == iov_type.name() => Ok(slot),
            _ => Err(ManagerError::UnknownIovType(iov_type.name().to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;
    use serde_json::json;

    fn key(low: i64, high: i64) -> IovKey {
        IovKey::new(low, high).unwrap()
    }

    #[test]
    fn test_register_iov_type_is_idempotent() {
        let mut mgr = ConditionsManager::new();
        let (created, first) = mgr.register_iov_type(1, "run");
        assert!(created);

        let (created_again, second) = mgr.register_iov_type(1, "run");
        assert!(!created_again);
        assert!(Arc::ptr_eq(&first.unwrap(), &second.unwrap()));
    }

    #[test]
    fn test_register_iov_type_by_name_ignores_discriminator() {
        let mut mgr = ConditionsManager::new();
        mgr.register_iov_type(1, "run");
        let (created, existing) = mgr.register_iov_type(5, "run");
        assert!(!created);
        assert_eq!(existing.unwrap().discriminator(), 1);
    }

    #[test]
    fn test_register_iov_type_rejects_conflicts() {
        let mut mgr = ConditionsManager::new();
        mgr.register_iov_type(1, "run");

        assert_eq!(mgr.register_iov_type(1, "time"), (false, None));
        assert_eq!(mgr.register_iov_type(MAX_IOV_TYPES, "epoch"), (false, None));
        assert_eq!(mgr.iov_types().count(), 1);
    }

    #[test]
    fn test_require_iov_type_reports_unusable() {
        let mut mgr = ConditionsManager::new();
        mgr.register_iov_type(2, "time");

        assert!(mgr.require_iov_type(3, "run").is_ok());
        let err = mgr.require_iov_type(2, "epoch").unwrap_err();
        assert_eq!(
            err,
            ManagerError::UnusableIovType {
                name: "epoch".into(),
                discriminator: 2
            }
        );
    }

    #[test]
    fn test_register_iov_returns_same_pool() {
        let mut mgr = ConditionsManager::new();
        let run = mgr.register_iov_type(1, "run").1.unwrap();

        let first = mgr.register_iov(&run, key(100, 200)).unwrap().iov().clone();
        let second = mgr.register_iov(&run, key(100, 200)).unwrap().iov().clone();
        let other = mgr.register_iov(&run, key(200, 300)).unwrap().iov().clone();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(mgr.iov_pool(&run).unwrap().len(), 2);
    }

    #[test]
    fn test_register_iov_unknown_type() {
        let mut mgr = ConditionsManager::new();
        let foreign = IovType::new(1, "run");
        let err = mgr.register_iov(&foreign, key(0, 1)).unwrap_err();
        assert_eq!(err, ManagerError::UnknownIovType("run".into()));
    }

    #[test]
    fn test_insert_delegates_to_pool() {
        let mut mgr = ConditionsManager::new();
        let run = mgr.register_iov_type(1, "run").1.unwrap();
        let iov = mgr.register_iov(&run, key(100, 200)).unwrap().iov().clone();

        let c1 = Condition::shared("/det", "c1", json!(1), iov.clone());
        assert!(mgr.insert(c1.clone()).unwrap());
        assert!(!mgr.insert(c1).unwrap());
        assert_eq!(mgr.pool(&run, &key(100, 200)).unwrap().len(), 1);
        assert_eq!(mgr.condition_count(), 1);
    }

    #[test]
    fn test_insert_creates_missing_pool() {
        let mut mgr = ConditionsManager::new();
        mgr.register_iov_type(1, "run");

        let detached = Arc::new(Iov::detached(1, "run", key(5, 6)));
        let c = Condition::shared("/det", "c1", json!(1), detached);
        assert!(mgr.insert(c).unwrap());

        let run = mgr.iov_type("run").unwrap();
        assert_eq!(mgr.pool(&run, &key(5, 6)).unwrap().len(), 1);
    }

    #[test]
    fn test_prepare_selects_containing_pools() {
        let mut mgr = ConditionsManager::new();
        let run = mgr.register_iov_type(1, "run").1.unwrap();

        for (low, high, name) in [(0, 1000, "wide"), (100, 200, "narrow"), (300, 400, "other")] {
            let pool = mgr.register_iov(&run, key(low, high)).unwrap();
            let iov = pool.iov().clone();
            pool.insert(Condition::shared("/det", name, json!(low), iov));
        }

        let required = Iov::new(run.clone(), IovKey::point(150));
        let user_pool = mgr.prepare(&required).unwrap();

        let mut names = Vec::new();
        user_pool.scan(|c| names.push(c.name().to_string()));
        assert_eq!(names, vec!["wide", "narrow"]);
        assert_eq!(user_pool.validity().key(), key(100, 200));
    }

    #[test]
    fn test_prepare_without_match() {
        let mut mgr = ConditionsManager::new();
        let run = mgr.register_iov_type(1, "run").1.unwrap();
        mgr.register_iov(&run, key(0, 10)).unwrap();

        let required = Iov::new(run, IovKey::point(50));
        let user_pool = mgr.prepare(&required).unwrap();
        assert!(user_pool.is_empty());
        assert_eq!(user_pool.validity().key(), IovKey::point(50));
    }

    #[test]
    fn test_prepare_unknown_type() {
        let mgr = ConditionsManager::new();
        let required = Iov::detached(3, "time", IovKey::point(1));
        assert!(mgr.prepare(&required).is_err());
    }
}
