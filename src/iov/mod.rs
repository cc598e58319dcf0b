//! Interval-of-validity subsystem
//!
//! Every condition is valid only within an IOV. An IOV is a `[low, high]`
//! key expressed in one named dimension (its `IovType`).
//!
//! # Invariants
//!
//! - `low <= high` for every key
//! - An IOV belongs to exactly one IOV type
//! - IOV types are immutable once created

mod errors;
mod types;

pub use errors::{IovError, IovErrorCode, IovResult, Severity};
pub use types::{Iov, IovKey, IovType, MAX_IOV_TYPES};
