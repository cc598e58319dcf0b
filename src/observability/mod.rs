//! Observability subsystem
//!
//! - Structured logging (JSON lines)
//! - Typed lifecycle events
//! - Scope guards for operation outcome and duration
//! - Persistency counters
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on execution; logging never fails a caller
//! 3. No background threads
//!
//! # Usage
//!
//! ```ignore
//! use condstore::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::ImportDuplicate, &[("condition", "c1")]);
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use scope::{DurationCell, DurationStamp, ObservationScope};

/// Log a lifecycle event with fields at its default severity
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event_with_fields() {
        log_event_with_fields(Event::ImportDuplicate, &[("condition", "c1"), ("identifier", "A")]);
    }
}
