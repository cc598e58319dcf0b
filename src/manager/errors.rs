//! # Manager Errors

use thiserror::Error;

/// Result type for manager operations
pub type ManagerResult<T> = Result<T, ManagerError>;

/// Conditions manager errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManagerError {
    #[error("IOV type not registered in this manager: {0}")]
    UnknownIovType(String),

    #[error("IOV type cannot be registered: {name} (discriminator {discriminator})")]
    UnusableIovType { name: String, discriminator: u32 },
}

impl ManagerError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ManagerError::UnknownIovType(_) => "COND_MANAGER_UNKNOWN_IOV_TYPE",
            ManagerError::UnusableIovType { .. } => "COND_MANAGER_UNUSABLE_IOV_TYPE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ManagerError::UnusableIovType {
            name: "run".into(),
            discriminator: 99,
        };
        assert!(err.to_string().contains("run"));
        assert!(err.to_string().contains("99"));
        assert_eq!(err.code(), "COND_MANAGER_UNUSABLE_IOV_TYPE");
    }
}
