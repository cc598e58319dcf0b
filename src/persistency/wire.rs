//! Stored catalog format
//!
//! One JSON object per catalog:
//!
//! ```text
//! { name, title, created_at, condition_pools, iov_pools, user_pools, duration }
//! ```
//!
//! Entries carry `{ identifier, iov_type_name, iov_discriminator,
//! interval_key: { low, high }, conditions }`. Saving borrows from the live
//! catalog; loading yields owned values.

use std::borrow::Cow;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::catalog::CatalogEntry;
use crate::condition::{Condition, ConditionKey, ConditionRef};
use crate::iov::{Iov, IovKey};

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct PersistentCatalog<'a> {
    pub name: Cow<'a, str>,
    pub title: Cow<'a, str>,
    pub created_at: Cow<'a, str>,
    pub condition_pools: Vec<PersistentEntry<'a>>,
    pub iov_pools: Vec<PersistentEntry<'a>>,
    pub user_pools: Vec<PersistentEntry<'a>>,
    pub duration: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct PersistentEntry<'a> {
    pub identifier: Cow<'a, str>,
    pub iov_type_name: Cow<'a, str>,
    pub iov_discriminator: u32,
    pub interval_key: IovKey,
    pub conditions: Vec<PersistentCondition<'a>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct PersistentCondition<'a> {
    pub detector: Cow<'a, str>,
    pub name: Cow<'a, str>,
    pub key: ConditionKey,
    pub payload: Cow<'a, Value>,
}

impl<'a> PersistentEntry<'a> {
    pub fn borrowed(entry: &'a CatalogEntry) -> Self {
        Self {
            identifier: Cow::Borrowed(&entry.identifier),
            iov_type_name: Cow::Borrowed(&entry.iov_type_name),
            iov_discriminator: entry.iov_discriminator,
            interval_key: entry.interval_key,
            conditions: entry
                .conditions
                .iter()
                .map(|c| PersistentCondition::borrowed(c))
                .collect(),
        }
    }

    /// Rebuilds the entry; conditions are bound to one detached IOV built
    /// from the entry's type and key.
    pub fn into_entry(self) -> CatalogEntry {
        let iov = Arc::new(Iov::detached(
            self.iov_discriminator,
            &*self.iov_type_name,
            self.interval_key,
        ));
        let conditions = self
            .conditions
            .into_iter()
            .map(|c| c.into_condition(iov.clone()))
            .collect();

        CatalogEntry {
            identifier: self.identifier.into_owned(),
            iov_type_name: self.iov_type_name.into_owned(),
            iov_discriminator: self.iov_discriminator,
            interval_key: self.interval_key,
            conditions,
        }
    }
}

impl<'a> PersistentCondition<'a> {
    fn borrowed(condition: &'a Condition) -> Self {
        Self {
            detector: Cow::Borrowed(condition.detector()),
            name: Cow::Borrowed(condition.name()),
            key: condition.key(),
            payload: Cow::Borrowed(condition.payload()),
        }
    }

    fn into_condition(self, iov: Arc<Iov>) -> ConditionRef {
        Arc::new(Condition::with_key(
            self.detector.into_owned(),
            self.name.into_owned(),
            self.key,
            self.payload.into_owned(),
            iov,
        ))
    }
}

pub(crate) fn borrow_entries(entries: &[CatalogEntry]) -> Vec<PersistentEntry<'_>> {
    entries.iter().map(PersistentEntry::borrowed).collect()
}

pub(crate) fn into_entries(entries: Vec<PersistentEntry<'_>>) -> Vec<CatalogEntry> {
    entries.into_iter().map(PersistentEntry::into_entry).collect()
}
