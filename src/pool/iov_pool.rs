//! Per-dimension pool of conditions pools, keyed by interval

use std::collections::HashMap;
use std::sync::Arc;

use super::conditions_pool::ConditionsPool;
use crate::iov::{Iov, IovKey, IovType};

/// All conditions pools of one IOV type.
///
/// At most one pool exists per distinct key. Elements iterate in the order
/// their keys were first registered.
#[derive(Debug)]
pub struct ConditionsIovPool {
    iov_type: Arc<IovType>,
    elements: Vec<(IovKey, ConditionsPool)>,
    index: HashMap<IovKey, usize>,
}

impl ConditionsIovPool {
    /// Creates an empty pool for one IOV type
    pub fn new(iov_type: Arc<IovType>) -> Self {
        Self {
            iov_type,
            elements: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// The IOV type of every element
    pub fn iov_type(&self) -> &Arc<IovType> {
        &self.iov_type
    }

    /// Iterates `(key, pool)` pairs in insertion order
    pub fn elements(&self) -> impl Iterator<Item = (&IovKey, &ConditionsPool)> {
        self.elements.iter().map(|(key, pool)| (key, pool))
    }

    /// Looks up the pool for an exact key
    pub fn get(&self, key: &IovKey) -> Option<&ConditionsPool> {
        self.index.get(key).map(|&idx| &self.elements[idx].1)
    }

    /// Returns the pool for `key`, creating it on first use
    pub fn get_or_create(&mut self, key: IovKey) -> &mut ConditionsPool {
        let idx = match self.index.get(&key) {
            Some(&idx) => idx,
            None => {
                let iov = Arc::new(Iov::new(self.iov_type.clone(), key));
                self.elements.push((key, ConditionsPool::new(iov)));
                let idx = self.elements.len() - 1;
                self.index.insert(key, idx);
                idx
            }
        };
        &mut self.elements[idx].1
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// True if no pool has been created yet
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Total conditions over all pools
    pub fn condition_count(&self) -> usize {
        self.elements.iter().map(|(_, pool)| pool.len()).sum()
    }
}
