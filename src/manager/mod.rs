//! Conditions Manager subsystem
//!
//! The manager owns the IOV type registry and, per type, a
//! `ConditionsIovPool`. Pools are created lazily on first lookup and live as
//! long as the manager.
//!
//! # Invariants
//!
//! - One IOV type per name, one name per discriminator
//! - At most one pool per `(type, key)`
//! - Lookup is exact-key only; no overlap resolution

mod errors;
mod manager;

pub use errors::{ManagerError, ManagerResult};
pub use manager::ConditionsManager;
