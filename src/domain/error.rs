//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.
//!
//! Data-quality problems in the input snapshot are never errors here: the
//! engine skips or defaults those records and reports counts instead. These
//! variants cover programming and configuration mistakes of the caller.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Caller passed an argument the engine cannot work with
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Rank table, bonus amounts or overrides are inconsistent
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl DomainError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Check if this is the caller's fault (maps to a 4xx at the boundary)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_is_client_error() {
        let err = DomainError::invalid_argument("window end before start");

        assert!(err.is_client_error());
        assert!(err.to_string().contains("window end before start"));
    }

    #[test]
    fn test_configuration_error_is_not_client_error() {
        let err = DomainError::InvalidConfiguration("empty rank table".to_string());
        assert!(!err.is_client_error());
    }
}
