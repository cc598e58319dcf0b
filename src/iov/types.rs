//! IOV value types
//!
//! An `IovType` names one validity dimension ("run", "time", ...). An `Iov`
//! is a concrete `[low, high]` range in one of those dimensions.

use std::cmp::{max, min};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::errors::{IovError, IovResult};

/// Upper bound (exclusive) on IOV type discriminators
pub const MAX_IOV_TYPES: u32 = 32;

/// Descriptor of one validity dimension.
///
/// Immutable once created. Managers hand these out as `Arc<IovType>` and
/// never mutate or remove a registered type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IovType {
    name: String,
    discriminator: u32,
}

impl IovType {
    /// Creates a new IOV type descriptor
    pub fn new(discriminator: u32, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            discriminator,
        }
    }

    /// Returns the unique type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the type discriminator
    pub fn discriminator(&self) -> u32 {
        self.discriminator
    }
}

impl fmt::Display for IovType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.discriminator)
    }
}

/// Ordered interval bounds, `low <= high`.
///
/// Decoding goes through `IovKey::new`, so stored keys are validated too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawIovKey")]
pub struct IovKey {
    low: i64,
    high: i64,
}

/// Unvalidated wire form of `IovKey`
#[derive(Deserialize)]
struct RawIovKey {
    low: i64,
    high: i64,
}

impl TryFrom<RawIovKey> for IovKey {
    type Error = IovError;

    fn try_from(raw: RawIovKey) -> IovResult<Self> {
        IovKey::new(raw.low, raw.high)
    }
}

impl IovKey {
    /// Creates a key, rejecting inverted bounds
    pub fn new(low: i64, high: i64) -> IovResult<Self> {
        if low > high {
            return Err(IovError::invalid_key(low, high));
        }
        Ok(Self { low, high })
    }

    /// Inclusive lower bound
    pub fn low(&self) -> i64 {
        self.low
    }

    /// Inclusive upper bound
    pub fn high(&self) -> i64 {
        self.high
    }

    /// Key covering a single point
    pub fn point(value: i64) -> Self {
        Self {
            low: value,
            high: value,
        }
    }

    /// Key covering the whole axis
    pub fn unbounded() -> Self {
        Self {
            low: i64::MIN,
            high: i64::MAX,
        }
    }

    /// True if `other` lies entirely within this key
    pub fn contains(&self, other: &IovKey) -> bool {
        self.low <= other.low && other.high <= self.high
    }

    /// Intersection of two keys, `None` when disjoint
    pub fn intersect(&self, other: &IovKey) -> Option<IovKey> {
        let low = max(self.low, other.low);
        let high = min(self.high, other.high);
        if low > high {
            None
        } else {
            Some(IovKey { low, high })
        }
    }
}

impl fmt::Display for IovKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.low, self.high)
    }
}

/// A concrete interval of validity.
///
/// Holds a shared reference to its type plus a copy of the discriminator so
/// equality checks never need to dereference the type.
#[derive(Debug, Clone)]
pub struct Iov {
    iov_type: Arc<IovType>,
    discriminator: u32,
    key: IovKey,
}

impl Iov {
    /// Creates an IOV of the given type and key
    pub fn new(iov_type: Arc<IovType>, key: IovKey) -> Self {
        let discriminator = iov_type.discriminator();
        Self {
            iov_type,
            discriminator,
            key,
        }
    }

    /// Creates an IOV bound to a fresh, unregistered type.
    ///
    /// Used for conditions read back from storage before they are imported
    /// into a manager.
    pub fn detached(discriminator: u32, type_name: impl Into<String>, key: IovKey) -> Self {
        Self::new(Arc::new(IovType::new(discriminator, type_name)), key)
    }

    /// Returns the IOV type
    pub fn iov_type(&self) -> &Arc<IovType> {
        &self.iov_type
    }

    /// Returns the type name
    pub fn type_name(&self) -> &str {
        self.iov_type.name()
    }

    /// Returns the discriminator copy
    pub fn discriminator(&self) -> u32 {
        self.discriminator
    }

    /// Returns the interval key
    pub fn key(&self) -> IovKey {
        self.key
    }

    /// True if both IOVs are of the same dimension
    pub fn same_type(&self, other: &Iov) -> bool {
        self.discriminator == other.discriminator
    }

    /// True if `other` is of the same type and lies within this interval
    pub fn contains(&self, other: &Iov) -> bool {
        self.same_type(other) && self.key.contains(&other.key)
    }
}

impl PartialEq for Iov {
    fn eq(&self, other: &Self) -> bool {
        self.discriminator == other.discriminator && self.key == other.key
    }
}

impl Eq for Iov {}

impl fmt::Display for Iov {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.iov_type.name(), self.key)
    }
}
