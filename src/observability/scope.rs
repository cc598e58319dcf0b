//! Scope guards
//!
//! - `ObservationScope` logs `{name}_BEGIN`, then `{name}_COMPLETE` or
//!   `{name}_FAILED`; a scope dropped without either logs `{name}_INCOMPLETE`
//! - `DurationStamp` writes elapsed seconds into a `DurationCell` on drop,
//!   so the measurement covers every exit path

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use super::logger::Logger;

/// A scope that logs begin and outcome events
pub struct ObservationScope {
    name: &'static str,
    fields: Vec<(&'static str, String)>,
    finished: bool,
}

impl ObservationScope {
    /// Opens a scope with identifying fields; logs `{name}_BEGIN`
    pub fn with_fields(name: &'static str, fields: &[(&'static str, &str)]) -> Self {
        let scope = Self {
            name,
            fields: fields.iter().map(|(k, v)| (*k, v.to_string())).collect(),
            finished: false,
        };
        Logger::info(&format!("{}_BEGIN", name), &scope.field_refs());
        scope
    }

    /// Logs `{name}_COMPLETE` with the scope fields plus `extra`
    pub fn complete_with_fields(mut self, extra: &[(&str, &str)]) {
        self.finished = true;
        let mut fields = self.field_refs();
        fields.extend(extra.iter().copied());
        Logger::info(&format!("{}_COMPLETE", self.name), &fields);
    }

    /// Logs `{name}_FAILED` at ERROR level
    pub fn fail(mut self, reason: &str) {
        self.finished = true;
        let mut fields = self.field_refs();
        fields.push(("reason", reason));
        Logger::error(&format!("{}_FAILED", self.name), &fields);
    }

    /// Logs `{name}_FAILED` at FATAL level
    pub fn fail_fatal(mut self, reason: &str) {
        self.finished = true;
        let mut fields = self.field_refs();
        fields.push(("reason", reason));
        Logger::fatal(&format!("{}_FAILED", self.name), &fields);
    }

    fn field_refs(&self) -> Vec<(&str, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str())).collect()
    }
}

impl Drop for ObservationScope {
    fn drop(&mut self) {
        if !self.finished {
            Logger::warn(
                &format!("{}_INCOMPLETE", self.name),
                &[("reason", "scope dropped without completion")],
            );
        }
    }
}

/// Seconds of the most recent timed operation, stored as `f64` bits
#[derive(Debug, Default)]
pub struct DurationCell(AtomicU64);

impl DurationCell {
    /// A cell holding `seconds`
    pub fn new(seconds: f64) -> Self {
        Self(AtomicU64::new(seconds.to_bits()))
    }

    /// Last recorded value
    pub fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    /// Overwrites the recorded value
    pub fn set(&self, seconds: f64) {
        self.0.store(seconds.to_bits(), Ordering::Relaxed);
    }
}

/// Records the wall-clock cost of a scope into `target` on drop.
///
/// The previous value is overwritten, never accumulated.
pub struct DurationStamp<'a> {
    start: Instant,
    target: &'a DurationCell,
}

impl<'a> DurationStamp<'a> {
    /// Starts measuring
    pub fn new(target: &'a DurationCell) -> Self {
        Self {
            start: Instant::now(),
            target,
        }
    }
}

impl Drop for DurationStamp<'_> {
    fn drop(&mut self) {
        self.target.set(self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_scope_complete() {
        let scope = ObservationScope::with_fields("TEST", &[("object", "Conditions")]);
        scope.complete_with_fields(&[("bytes", "42")]);
    }

    #[test]
    fn test_scope_fail() {
        ObservationScope::with_fields("TEST", &[]).fail("write failed");
        ObservationScope::with_fields("TEST", &[]).fail_fatal("corrupt");
    }

    #[test]
    fn test_scope_drop_without_complete() {
        let scope = ObservationScope::with_fields("TEST", &[]);
        drop(scope);
    }

    #[test]
    fn test_duration_stamp_overwrites() {
        let cell = DurationCell::new(1000.0);
        {
            let _stamp = DurationStamp::new(&cell);
        }
        assert!(cell.get() >= 0.0);
        assert!(cell.get() < 1000.0);
    }

    #[test]
    fn test_duration_stamp_runs_on_early_exit() {
        fn fallible(cell: &DurationCell) -> Result<(), ()> {
            let _stamp = DurationStamp::new(cell);
            std::thread::sleep(Duration::from_millis(5));
            Err(())
        }

        let cell = DurationCell::new(-1.0);
        assert!(fallible(&cell).is_err());
        assert!(cell.get() >= 0.005);
    }
}
