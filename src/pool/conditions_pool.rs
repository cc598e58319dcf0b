//! Conditions pool: all conditions sharing one IOV

use std::sync::Arc;

use super::members::MemberSet;
use crate::condition::{ConditionKey, ConditionRef};
use crate::iov::Iov;

/// Owning collection of conditions that share exactly one IOV.
///
/// Each stored condition holds one strong reference owned by the pool.
#[derive(Debug)]
pub struct ConditionsPool {
    iov: Arc<Iov>,
    members: MemberSet,
}

impl ConditionsPool {
    /// Creates an empty pool for the given IOV
    pub fn new(iov: Arc<Iov>) -> Self {
        Self {
            iov,
            members: MemberSet::new(),
        }
    }

    /// The IOV shared by all members
    pub fn iov(&self) -> &Arc<Iov> {
        &self.iov
    }

    /// Inserts a condition unless one with the same key is present.
    ///
    /// On success the pool keeps the passed reference. On duplicate the
    /// reference is dropped and the existing member is left untouched.
    pub fn insert(&mut self, condition: ConditionRef) -> bool {
        self.members.insert(condition)
    }

    /// Appends every member to `out` in insertion order
    pub fn select_all(&self, out: &mut Vec<ConditionRef>) {
        out.extend(self.members.iter().cloned());
    }

    /// Looks up a member by key
    pub fn get(&self, key: ConditionKey) -> Option<&ConditionRef> {
        self.members.get(key)
    }

    /// True if a member with `key` exists
    pub fn contains(&self, key: ConditionKey) -> bool {
        self.members.contains(key)
    }

    /// Iterates members in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &ConditionRef> {
        self.members.iter()
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True if the pool holds no conditions
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
