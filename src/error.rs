//! Error types for devlink.

use thiserror::Error;

/// Common error type for devlink.
#[derive(Error, Debug)]
pub enum DevlinkError {
    /// Database error.
    ///
    /// Generic database error wrapping failures from the sqlx backend.
    #[error("database error: {0}")]
    Database(String),

    /// Database connection error.
    #[error("database connection error: {0}")]
    DatabaseConnection(String),

    /// A UNIQUE constraint rejected the write.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

// Conversion from sqlx errors
impl From<sqlx::Error> for DevlinkError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return DevlinkError::UniqueViolation(db_err.message().to_string());
            }
        }
        DevlinkError::Database(e.to_string())
    }
}

/// Result type alias for devlink operations.
pub type Result<T> = std::result::Result<T, DevlinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_display() {
        let err = DevlinkError::Auth("invalid password".to_string());
        assert_eq!(err.to_string(), "authentication error: invalid password");
    }

    #[test]
    fn test_validation_error_display() {
        let err = DevlinkError::Validation("email is malformed".to_string());
        assert_eq!(err.to_string(), "validation error: email is malformed");
    }

    #[test]
    fn test_not_found_error_display() {
        let err = DevlinkError::NotFound("user".to_string());
        assert_eq!(err.to_string(), "user not found");
    }

    #[test]
    fn test_unique_violation_display() {
        let err = DevlinkError::UniqueViolation("UNIQUE constraint failed: users.email".to_string());
        assert_eq!(
            err.to_string(),
            "unique constraint violated: UNIQUE constraint failed: users.email"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: DevlinkError = io_err.into();
        assert!(matches!(err, DevlinkError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }
}
