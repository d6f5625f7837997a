//! Application-wide error types.
//!
//! Every public service operation returns [`AppResult`]. The variant is the
//! error *kind*; the payload is the human-readable message shown to the user.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error kinds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// Malformed input (missing field, out-of-range value).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation attempted on an entity in the wrong status.
    #[error("State conflict: {0}")]
    StateConflict(String),

    /// A domain rule was violated (unbalanced entry, closed period, ...).
    #[error("Business rule violation: {0}")]
    InvariantViolation(String),

    /// The caller lacks the permission for the operation.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Unexpected failure in the data layer.
    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

impl AppError {
    /// Returns the error code for logs and API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::StateConflict(_) => "STATE_CONFLICT",
            Self::InvariantViolation(_) => "INVARIANT_VIOLATION",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Infrastructure(_) => "INFRASTRUCTURE_ERROR",
        }
    }

    /// Returns the user-facing message without the kind prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(msg)
            | Self::NotFound(msg)
            | Self::StateConflict(msg)
            | Self::InvariantViolation(msg)
            | Self::Forbidden(msg)
            | Self::Infrastructure(msg) => msg,
        }
    }

    /// Returns true for failures caused by the data layer rather than the caller.
    #[must_use]
    pub const fn is_infrastructure(&self) -> bool {
        matches!(self, Self::Infrastructure(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::Validation(String::new()), "VALIDATION_ERROR")]
    #[case(AppError::NotFound(String::new()), "NOT_FOUND")]
    #[case(AppError::StateConflict(String::new()), "STATE_CONFLICT")]
    #[case(AppError::InvariantViolation(String::new()), "INVARIANT_VIOLATION")]
    #[case(AppError::Forbidden(String::new()), "FORBIDDEN")]
    #[case(AppError::Infrastructure(String::new()), "INFRASTRUCTURE_ERROR")]
    fn test_error_codes(#[case] err: AppError, #[case] code: &str) {
        assert_eq!(err.error_code(), code);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::StateConflict("msg".into()).to_string(),
            "State conflict: msg"
        );
        assert_eq!(
            AppError::InvariantViolation("msg".into()).to_string(),
            "Business rule violation: msg"
        );
        assert_eq!(
            AppError::Infrastructure("msg".into()).to_string(),
            "Infrastructure error: msg"
        );
    }

    #[test]
    fn test_message_strips_kind() {
        let err = AppError::NotFound("Cash payment 42 not found".into());
        assert_eq!(err.message(), "Cash payment 42 not found");
    }

    #[test]
    fn test_is_infrastructure() {
        assert!(AppError::Infrastructure("db".into()).is_infrastructure());
        assert!(!AppError::Validation("x".into()).is_infrastructure());
    }
}
