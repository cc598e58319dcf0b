//! User pool: the conditions active for one validity

use super::members::MemberSet;
use crate::condition::{ConditionKey, ConditionRef};
use crate::iov::Iov;

/// Materialized, read-facing set of conditions active for one IOV.
///
/// Built on demand (see `ConditionsManager::prepare`). Members may come from
/// several conditions pools; keys are unique.
#[derive(Debug)]
pub struct UserPool {
    validity: Iov,
    members: MemberSet,
}

impl UserPool {
    /// Creates an empty user pool valid for `validity`
    pub fn new(validity: Iov) -> Self {
        Self {
            validity,
            members: MemberSet::new(),
        }
    }

    /// The interval this pool is active for
    pub fn validity(&self) -> &Iov {
        &self.validity
    }

    /// Adds a condition unless its key is already present
    pub fn insert(&mut self, condition: ConditionRef) -> bool {
        self.members.insert(condition)
    }

    /// Invokes `visitor` once per member; returns the number visited
    pub fn scan<F>(&self, mut visitor: F) -> usize
    where
        F: FnMut(&ConditionRef),
    {
        let mut count = 0;
        for condition in self.members.iter() {
            visitor(condition);
            count += 1;
        }
        count
    }

    /// Looks up a member by key
    pub fn get(&self, key: ConditionKey) -> Option<&ConditionRef> {
        self.members.get(key)
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True if the pool is empty
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
