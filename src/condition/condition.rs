//! Condition payload items
//!
//! Conditions are shared between pools and catalogs as `ConditionRef`
//! (`Arc<Condition>`). The strong count is the reference count: a condition
//! is dropped exactly when the last pool or catalog entry releases it.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;

use super::key::ConditionKey;
use crate::iov::Iov;

/// Shared handle to a condition
pub type ConditionRef = Arc<Condition>;

/// One versioned calibration or alignment datum.
///
/// Everything but the IOV back-reference is immutable. The IOV is rebound
/// when a condition is imported into a different store, so that it reports
/// the destination's canonical interval.
pub struct Condition {
    detector: String,
    name: String,
    key: ConditionKey,
    payload: Value,
    iov: RwLock<Arc<Iov>>,
}

impl Condition {
    /// Creates a condition for a detector identity and item name.
    ///
    /// The key is derived from `detector` and `name`.
    pub fn new(
        detector: impl Into<String>,
        name: impl Into<String>,
        payload: Value,
        iov: Arc<Iov>,
    ) -> Self {
        let detector = detector.into();
        let name = name.into();
        let key = ConditionKey::new(&detector, &name);
        Self::with_key(detector, name, key, payload, iov)
    }

    /// Creates a condition with an explicit key
    pub fn with_key(
        detector: impl Into<String>,
        name: impl Into<String>,
        key: ConditionKey,
        payload: Value,
        iov: Arc<Iov>,
    ) -> Self {
        Self {
            detector: detector.into(),
            name: name.into(),
            key,
            payload,
            iov: RwLock::new(iov),
        }
    }

    /// Creates a shared condition
    pub fn shared(
        detector: impl Into<String>,
        name: impl Into<String>,
        payload: Value,
        iov: Arc<Iov>,
    ) -> ConditionRef {
        Arc::new(Self::new(detector, name, payload, iov))
    }

    /// Opaque detector element identity
    pub fn detector(&self) -> &str {
        &self.detector
    }

    /// Item name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stable key
    pub fn key(&self) -> ConditionKey {
        self.key
    }

    /// Payload data
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Governing IOV
    pub fn iov(&self) -> Arc<Iov> {
        self.iov
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Rebinds the governing IOV
    pub fn rebind_iov(&self, iov: Arc<Iov>) {
        *self.iov.write().unwrap_or_else(PoisonError::into_inner) = iov;
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition")
            .field("detector", &self.detector)
            .field("name", &self.name)
            .field("key", &self.key)
            .field("iov", &self.iov())
            .finish()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{} [{}] {}", self.detector, self.name, self.key, self.iov())
    }
}
