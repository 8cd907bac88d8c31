//! Error types for the taxa taxonomy library.

use thiserror::Error;

/// Result type alias using taxa's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for taxonomy operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Category not found
    #[error("Category not found: {0}")]
    CategoryNotFound(uuid::Uuid),

    /// Malformed input: duplicate slug, duplicate association,
    /// unknown category id in a replace call
    #[error("Validation error: {0}")]
    Validation(String),

    /// A move would make a category its own ancestor
    #[error("Cycle error: {0}")]
    Cycle(String),

    /// Write transaction aborted due to a concurrent conflict;
    /// distinct from Validation so callers can decide to retry
    #[error("Conflict error: {0}")]
    Conflict(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True for errors a caller may reasonably retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Conflict(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Validation(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("slug 'rust'".to_string());
        assert_eq!(err.to_string(), "Not found: slug 'rust'");
    }

    #[test]
    fn test_error_display_category_not_found() {
        let id = Uuid::nil();
        let err = Error::CategoryNotFound(id);
        assert_eq!(err.to_string(), format!("Category not found: {}", id));
    }

    #[test]
    fn test_error_display_validation() {
        let err = Error::Validation("duplicate slug".to_string());
        assert_eq!(err.to_string(), "Validation error: duplicate slug");
    }

    #[test]
    fn test_error_display_cycle() {
        let err = Error::Cycle("category would become its own ancestor".to_string());
        assert!(err.to_string().starts_with("Cycle error:"));
    }

    #[test]
    fn test_error_display_conflict() {
        let err = Error::Conflict("serialization failure".to_string());
        assert_eq!(err.to_string(), "Conflict error: serialization failure");
    }

    #[test]
    fn test_only_conflict_is_retryable() {
        assert!(Error::Conflict("x".into()).is_retryable());
        assert!(!Error::Validation("x".into()).is_retryable());
        assert!(!Error::Cycle("x".into()).is_retryable());
        assert!(!Error::CategoryNotFound(Uuid::nil()).is_retryable());
    }

    #[test]
    fn test_category_not_found_with_random_uuid() {
        let id = Uuid::new_v4();
        let err = Error::CategoryNotFound(id);
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn test_error_debug_format() {
        let err = Error::NotFound("test".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("NotFound"));
    }

    #[test]
    fn test_result_type_ok() {
        fn get_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(get_result().unwrap(), 42);
    }
}
