//! Conditions: versioned calibration and alignment data items

mod condition;
mod key;

pub use condition::{Condition, ConditionRef};
pub use key::ConditionKey;
