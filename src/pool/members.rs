//! Insertion-ordered, key-unique condition set

use std::collections::HashMap;

use crate::condition::{ConditionKey, ConditionRef};

/// Members kept in insertion order with a key index for duplicate checks
#[derive(Debug, Default)]
pub(crate) struct MemberSet {
    ordered: Vec<ConditionRef>,
    by_key: HashMap<ConditionKey, usize>,
}

impl MemberSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Stores the condition unless its key is already present
    pub(crate) fn insert(&mut self, condition: ConditionRef) -> bool {
        let key = condition.key();
        if self.by_key.contains_key(&key) {
            return false;
        }
        self.by_key.insert(key, self.ordered.len());
        self.ordered.push(condition);
        true
    }

    pub(crate) fn get(&self, key: ConditionKey) -> Option<&ConditionRef> {
        self.by_key.get(&key).map(|&idx| &self.ordered[idx])
    }

    pub(crate) fn contains(&self, key: ConditionKey) -> bool {
        self.by_key.contains_key(&key)
    }

    pub(crate) fn iter(&self) -> std::slice::Iter<'_, ConditionRef> {
        self.ordered.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.ordered.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}
