//! Conditions pools
//!
//! Three levels of grouping:
//!
//! - `ConditionsPool`: conditions sharing one IOV
//! - `ConditionsIovPool`: one pool per interval key, for one IOV type
//! - `UserPool`: conditions active for one validity, drawn from several pools
//!
//! # Invariants
//!
//! - Members are unique by `ConditionKey`; duplicate inserts are no-ops
//! - Iteration follows insertion order
//! - A pool holds one strong reference per member

mod conditions_pool;
mod iov_pool;
mod members;
mod user_pool;

pub use conditions_pool::ConditionsPool;
pub use iov_pool::ConditionsIovPool;
pub use user_pool::UserPool;
