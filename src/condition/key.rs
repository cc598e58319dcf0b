//! Stable condition keys
//!
//! A key is the CRC32 of the detector identity in the upper 32 bits and the
//! CRC32 of the item name in the lower 32 bits. The value only depends on the
//! two strings, so it is identical across builds and processes.

use std::fmt;

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

/// 64-bit condition key used for duplicate detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConditionKey(u64);

impl ConditionKey {
    /// Derives the key for a detector identity and item name
    pub fn new(detector: &str, name: &str) -> Self {
        let high = hash32(detector) as u64;
        let low = hash32(name) as u64;
        Self((high << 32) | low)
    }

    /// Wraps a raw key value
    pub fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw key value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConditionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016X}", self.0)
    }
}

fn hash32(value: &str) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(value.as_bytes());
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_deterministic() {
        assert_eq!(
            ConditionKey::new("/world/tracker", "alignment"),
            ConditionKey::new("/world/tracker", "alignment")
        );
    }

    #[test]
    fn test_key_splits_detector_and_item() {
        let a = ConditionKey::new("/world/tracker", "alignment");
        let b = ConditionKey::new("/world/tracker", "temperature");
        let c = ConditionKey::new("/world/calo", "alignment");

        let detector = |k: ConditionKey| k.value() >> 32;
        let item = |k: ConditionKey| k.value() as u32;

        assert_eq!(detector(a), detector(b));
        assert_ne!(item(a), item(b));
        assert_eq!(item(a), item(c));
        assert_ne!(detector(a), detector(c));
    }

    #[test]
    fn test_key_display_is_fixed_width_hex() {
        let key = ConditionKey::from_raw(0xAB);
        assert_eq!(key.to_string(), "00000000000000AB");
    }
}
