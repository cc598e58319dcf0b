//! IOV error types
//!
//! Error codes:
//! - COND_IOV_INVALID_KEY (ERROR severity)

use std::fmt;

/// Severity levels for IOV errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, store continues
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// IOV-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IovErrorCode {
    /// Interval bounds are inverted
    CondIovInvalidKey,
}

impl IovErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            IovErrorCode::CondIovInvalidKey => "COND_IOV_INVALID_KEY",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Error
    }
}

impl fmt::Display for IovErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// IOV error with context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IovError {
    code: IovErrorCode,
    message: String,
    details: Option<String>,
}

impl IovError {
    /// Create an invalid key error for an inverted interval
    pub fn invalid_key(low: i64, high: i64) -> Self {
        Self {
            code: IovErrorCode::CondIovInvalidKey,
            message: "interval lower bound exceeds upper bound".to_string(),
            details: Some(format!("low: {}, high: {}", low, high)),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> IovErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns additional error details
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }
}

impl fmt::Display for IovError {
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

impl std::error::Error for IovError {}

/// Result type for IOV operations
pub type IovResult<T> = Result<T, IovError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_key_display() {
        let err = IovError::invalid_key(200, 100);
        let display = err.to_string();
        assert!(display.contains("COND_IOV_INVALID_KEY"));
        assert!(display.contains("ERROR"));
        assert!(display.contains("low: 200, high: 100"));
    }
}
