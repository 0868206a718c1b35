//! Error types for Mexazon

use thiserror::Error;

/// Result type alias using Mexazon's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Mexazon error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // Entity errors (E001-E099)
    #[error("Business '{0}' not found. Run `mexazon search` to list businesses.")]
    BusinessNotFound(i64),

    #[error("Postal code '{0}' not found in the catalog.")]
    PostalCodeNotFound(String),

    // Database errors (E400-E499)
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Failed to decode stored value: {0}")]
    Parse(String),

    // Input errors (E800-E899)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::BusinessNotFound(_) => "E001",
            Self::PostalCodeNotFound(_) => "E002",
            Self::DatabaseError(_) => "E400",
            Self::Parse(_) => "E401",
            Self::InvalidInput(_) => "E800",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::BusinessNotFound(_) => Some("mexazon search".to_string()),
            Self::PostalCodeNotFound(_) => Some("mexazon postal <postal_code>".to_string()),
            Self::DatabaseError(_) => Some("mexazon doctor".to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_not_found_error() {
        let error = Error::BusinessNotFound(42);
        assert_eq!(error.code(), "E001");
        assert_eq!(error.suggestion(), Some("mexazon search".to_string()));
        assert!(error.to_string().contains("42"));
    }

    #[test]
    fn test_database_error_wraps_sqlx() {
        let error: Error = sqlx::Error::RowNotFound.into();
        assert_eq!(error.code(), "E400");
        assert_eq!(error.suggestion(), Some("mexazon doctor".to_string()));
        assert!(error.to_string().starts_with("Database error"));
    }

    #[test]
    fn test_postal_code_not_found_error() {
        let error = Error::PostalCodeNotFound("04000".to_string());
        assert_eq!(error.code(), "E002");
        assert!(error.to_string().contains("04000"));
    }

    #[test]
    fn test_invalid_input_has_no_suggestion() {
        let error = Error::InvalidInput("postal code must not be blank".to_string());
        assert_eq!(error.code(), "E800");
        assert_eq!(error.suggestion(), None);
    }
}
