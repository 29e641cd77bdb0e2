//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unknown phase label: {0}")]
    UnknownPhase(String),

    #[error("Invalid session id: {0}")]
    InvalidSessionId(String),

    #[error("Invalid case input: {0}")]
    InvalidCaseInput(String),
}

impl DomainError {
    /// Check if this error was caused by caller-supplied input
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            DomainError::InvalidSessionId(_) | DomainError::InvalidCaseInput(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_phase_display() {
        let error = DomainError::UnknownPhase("triage".to_string());
        assert_eq!(error.to_string(), "Unknown phase label: triage");
    }

    #[test]
    fn test_is_input_error_check() {
        assert!(DomainError::InvalidSessionId(String::new()).is_input_error());
        assert!(DomainError::InvalidCaseInput("age".to_string()).is_input_error());
        assert!(!DomainError::UnknownPhase("x".to_string()).is_input_error());
    }
}
