//! condstore - conditions data keyed by interval of validity
//!
//! A reference-counted store of conditions grouped by IOV, with named
//! catalogs that snapshot pools, persist them in a storage container, and
//! import them back with duplicate-safe merging.

pub mod cli;
pub mod condition;
pub mod iov;
pub mod manager;
pub mod observability;
pub mod persistency;
pub mod pool;
pub mod storage;
