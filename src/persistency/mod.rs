//! Conditions persistency
//!
//! A named catalog of captured pool snapshots. Captures share conditions
//! with the live store by strong reference; the catalog is saved as one
//! object in a storage container and can later be imported, filtered, into
//! any manager.
//!
//! # Contract
//!
//! - Capture never deduplicates; import always does
//! - `clear()` (or drop) releases every captured reference
//! - `duration()` reports the most recent timed operation only

mod catalog;
mod import;
mod persistency;
mod wire;

pub use catalog::{matches_pattern, CatalogEntry, CatalogKind};
pub use import::ImportReport;
pub use persistency::{CatalogSummary, CollectionSummary, ConditionsPersistency};
