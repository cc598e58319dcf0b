//! Catalog entries and import filters

use std::fmt;
use std::str::FromStr;

use crate::condition::ConditionRef;
use crate::iov::{Iov, IovKey};

/// The three independent collections of a catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogKind {
    /// Captures of single conditions pools
    ConditionPools,
    /// Captures of whole IOV pools, one entry per key
    IovPools,
    /// Captures of user pools
    UserPools,
}

impl CatalogKind {
    /// Every kind, in storage order
    pub const ALL: [CatalogKind; 3] = [
        CatalogKind::ConditionPools,
        CatalogKind::IovPools,
        CatalogKind::UserPools,
    ];

    /// Field name of the collection
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogKind::ConditionPools => "condition_pools",
            CatalogKind::IovPools => "iov_pools",
            CatalogKind::UserPools => "user_pools",
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CatalogKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CatalogKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown catalog collection: {}", s))
    }
}

/// Filter match: `""` and `"*"` match anything, otherwise exact equality
pub fn matches_pattern(pattern: &str, value: &str) -> bool {
    pattern.is_empty() || pattern == "*" || pattern == value
}

/// One captured snapshot of conditions sharing an interval.
///
/// Holds one strong reference per captured condition until the catalog is
/// cleared. Duplicates within an entry are kept as captured.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    /// Caller-chosen capture label
    pub identifier: String,
    /// Name of the IOV type
    pub iov_type_name: String,
    /// Discriminator of the IOV type
    pub iov_discriminator: u32,
    /// Interval of the captured pool
    pub interval_key: IovKey,
    /// Captured conditions
    pub conditions: Vec<ConditionRef>,
}

impl CatalogEntry {
    /// Empty entry keyed by an IOV
    pub fn new(identifier: &str, iov: &Iov) -> Self {
        Self::with_key(identifier, iov, iov.key())
    }

    /// Empty entry with the type of `iov` and an explicit key
    pub fn with_key(identifier: &str, iov: &Iov, key: IovKey) -> Self {
        Self {
            identifier: identifier.to_string(),
            iov_type_name: iov.type_name().to_string(),
            iov_discriminator: iov.discriminator(),
            interval_key: key,
            conditions: Vec::new(),
        }
    }

    /// True if the entry passes both import filters
    pub fn matches(&self, identifier: &str, iov_type: &str) -> bool {
        matches_pattern(identifier, &self.identifier) && matches_pattern(iov_type, &self.iov_type_name)
    }

    /// Number of captured conditions
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// True if nothing was captured
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcards() {
        assert!(matches_pattern("", "batchA"));
        assert!(matches_pattern("*", "batchA"));
        assert!(matches_pattern("batchA", "batchA"));
        assert!(!matches_pattern("batch*", "batchA"));
        assert!(!matches_pattern("batchB", "batchA"));
    }

    #[test]
    fn test_entry_matches_both_filters() {
        let iov = Iov::detached(1, "run", IovKey::new(100, 200).unwrap());
        let entry = CatalogEntry::new("batchA", &iov);

        assert!(entry.matches("batchA", "run"));
        assert!(entry.matches("*", ""));
        assert!(!entry.matches("batchA", "time"));
        assert!(!entry.matches("other", "*"));
    }

    #[test]
    fn test_entry_copies_iov_identity() {
        let iov = Iov::detached(4, "time", IovKey::new(1, 2).unwrap());
        let entry = CatalogEntry::with_key("x", &iov, IovKey::point(9));
        assert_eq!(entry.iov_type_name, "time");
        assert_eq!(entry.iov_discriminator, 4);
        assert_eq!(entry.interval_key, IovKey::point(9));
        assert!(entry.is_empty());
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("iov_pools".parse::<CatalogKind>().unwrap(), CatalogKind::IovPools);
        assert!("pools".parse::<CatalogKind>().is_err());
    }
}
