//! Storage container subsystem
//!
//! A durable, named-object container. Objects are serialized as JSON and
//! framed in checksummed, append-only records.
//!
//! # Design Principles
//!
//! - Append-only; latest record for a name wins
//! - Checksum-verified on open; any malformed record fails the open
//! - fsync after every object write
//!
//! # Contract
//!
//! - `open(path)` fails with `COND_STORAGE_OPEN_FAILED`
//! - `read_object(name)` fails with `COND_OBJECT_NOT_FOUND`

mod checksum;
mod container;
mod errors;
mod record;

pub use checksum::compute_checksum;
pub use container::{ConditionsStorage, StorageMode, STORAGE_MAGIC};
pub use errors::{Severity, StorageError, StorageErrorCode, StorageResult};
pub use record::{ObjectRecord, MIN_RECORD_SIZE};
