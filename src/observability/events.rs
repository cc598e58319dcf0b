//! Observable events
//!
//! Events are explicit and typed. Each maps to one stable upper-case name.

use std::fmt;

/// Observable events of the conditions store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Capture
    /// Conditions pool captured into a catalog
    CapturePool,
    /// IOV pool captured into a catalog
    CaptureIovPool,
    /// User pool captured into a catalog
    CaptureUserPool,
    /// Catalog released its captured conditions
    CatalogCleared,

    // Storage
    /// Storage container opened
    StorageOpened,
    /// Storage container could not be opened (FATAL)
    StorageOpenFailed,
    /// Catalog could not be written
    CatalogSaveFailed,

    // Import
    /// Import pass complete
    ImportComplete,
    /// Condition already present in the destination pool
    ImportDuplicate,
    /// Catalog entry skipped, IOV type unusable
    ImportEntrySkipped,

    // CLI
    /// Configuration loaded
    ConfigLoaded,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::CapturePool => "CATALOG_CAPTURE_POOL",
            Event::CaptureIovPool => "CATALOG_CAPTURE_IOV_POOL",
            Event::CaptureUserPool => "CATALOG_CAPTURE_USER_POOL",
            Event::CatalogCleared => "CATALOG_CLEARED",

            Event::StorageOpened => "STORAGE_OPENED",
            Event::StorageOpenFailed => "STORAGE_OPEN_FAILED",
            Event::CatalogSaveFailed => "CATALOG_SAVE_FAILED",

            Event::ImportComplete => "CONDITION_IMPORT_COMPLETE",
            Event::ImportDuplicate => "CONDITION_IMPORT_DUPLICATE",
            Event::ImportEntrySkipped => "CONDITION_IMPORT_ENTRY_SKIPPED",

            Event::ConfigLoaded => "CONFIG_LOADED",
        }
    }

    /// Default severity for the event
    pub fn severity(&self) -> super::Severity {
        use super::Severity;
        match self {
            Event::StorageOpenFailed => Severity::Fatal,
            Event::CatalogSaveFailed => Severity::Error,
            Event::ImportDuplicate | Event::ImportEntrySkipped => Severity::Warn,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
