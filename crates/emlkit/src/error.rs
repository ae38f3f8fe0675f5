//! Error types for message building.

/// Result type alias for message building.
pub type Result<T> = std::result::Result<T, Error>;

/// Outcome of a single build: the complete message text or the failure.
pub type BuildResult = Result<String>;

/// Message building errors.
///
/// Every variant is raised before any output is produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Build input is not a structured object.
    #[error("Invalid input: {0}")]
    InputType(String),

    /// A required header is missing after assembly.
    #[error("Validation failed: {0}")]
    Validation(String),
}

impl Error {
    /// Creates the error raised when no `To` header is present.
    #[must_use]
    pub fn missing_to() -> Self {
        Self::Validation("missing To".to_string())
    }

    /// Returns true if this is a validation failure.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if the input was not a structured object.
    #[must_use]
    pub const fn is_input_type(&self) -> bool {
        matches!(self, Self::InputType(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(Error::missing_to().to_string(), "Validation failed: missing To");
        assert_eq!(
            Error::InputType("expected an object".to_string()).to_string(),
            "Invalid input: expected an object"
        );
    }

    #[test]
    fn test_error_predicates() {
        assert!(Error::missing_to().is_validation());
        assert!(!Error::missing_to().is_input_type());
        assert!(Error::InputType(String::new()).is_input_type());
    }
}
