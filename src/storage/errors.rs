//! Storage container error types
//!
//! Error codes:
//! - COND_STORAGE_OPEN_FAILED (FATAL severity)
//! - COND_OBJECT_NOT_FOUND (FATAL severity)
//! - COND_STORAGE_WRITE_FAILED (ERROR severity)
//! - COND_STORAGE_CORRUPTION (FATAL severity)

use std::fmt;
use std::io;
use std::path::Path;

/// Severity levels for storage errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, caller may continue
    Error,
    /// Data cannot be trusted; propagate, never retry
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Storage-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorCode {
    /// Container missing, unreadable, or corrupt at open
    CondStorageOpenFailed,
    /// Named object absent from a valid container
    CondObjectNotFound,
    /// Write or fsync failed
    CondStorageWriteFailed,
    /// Object bytes failed checksum or decoding
    CondStorageCorruption,
}

impl StorageErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            StorageErrorCode::CondStorageOpenFailed => "COND_STORAGE_OPEN_FAILED",
            StorageErrorCode::CondObjectNotFound => "COND_OBJECT_NOT_FOUND",
            StorageErrorCode::CondStorageWriteFailed => "COND_STORAGE_WRITE_FAILED",
            StorageErrorCode::CondStorageCorruption => "COND_STORAGE_CORRUPTION",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            StorageErrorCode::CondStorageWriteFailed => Severity::Error,
            StorageErrorCode::CondStorageOpenFailed
            | StorageErrorCode::CondObjectNotFound
            | StorageErrorCode::CondStorageCorruption => Severity::Fatal,
        }
    }
}

impl fmt::Display for StorageErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Storage error with full context
#[derive(Debug)]
pub struct StorageError {
    code: StorageErrorCode,
    message: String,
    details: Option<String>,
    source: Option<io::Error>,
}

impl StorageError {
    /// Container could not be opened
    pub fn open_failed(path: &Path, source: io::Error) -> Self {
        Self {
            code: StorageErrorCode::CondStorageOpenFailed,
            message: format!("failed to open storage: {}", path.display()),
            details: None,
            source: Some(source),
        }
    }

    /// Container opened but its contents are malformed
    pub fn open_corrupt(path: &Path, offset: u64, reason: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::CondStorageOpenFailed,
            message: format!("corrupt storage: {}: {}", path.display(), reason.into()),
            details: Some(format!("byte_offset: {}", offset)),
            source: None,
        }
    }

    /// Named object is absent
    pub fn object_not_found(name: &str, path: &Path) -> Self {
        Self {
            code: StorageErrorCode::CondObjectNotFound,
            message: format!("object not found: {}", name),
            details: Some(format!("storage: {}", path.display())),
            source: None,
        }
    }

    /// Write or fsync failed
    pub fn write_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: StorageErrorCode::CondStorageWriteFailed,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// Write refused before touching the file
    pub fn write_rejected(message: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::CondStorageWriteFailed,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Object bytes could not be decoded
    pub fn corruption_for_object(name: &str, reason: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::CondStorageCorruption,
            message: reason.into(),
            details: Some(format!("object: {}", name)),
            source: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> StorageErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns additional error details
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Returns whether this error is fatal
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
