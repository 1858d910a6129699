//! Error types for the object registry.
//!
//! Every failure is caller-correctable: fix the id, fix the scope, or stop
//! re-storing a fresh instance under an occupied key. There is no internal
//! fatal category and no retry logic.

use thiserror::Error;

/// Main error type for registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A scope id or object id was unusable (currently: empty string).
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// `store` was called with a different instance under an already-occupied
    /// `(scope, object id)` slot. The originally stored instance is untouched.
    #[error("Scope '{scope_id}' already holds a different instance under object id '{object_id}'")]
    Conflict { scope_id: String, object_id: String },

    /// `get` was called for an absent `(scope, object id)` slot.
    ///
    /// `find` and `exists` never produce this; they answer with
    /// `None`/`false` instead.
    #[error("Object with id '{object_id}' not found in scope '{scope_id}'")]
    NotFound { scope_id: String, object_id: String },
}

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

impl RegistryError {
    /// Create an `InvalidArgument` error with a preformatted message.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        RegistryError::InvalidArgument {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RegistryError::NotFound {
            scope_id: "User".into(),
            object_id: "1".into(),
        };
        assert_eq!(
            err.to_string(),
            "Object with id '1' not found in scope 'User'"
        );
    }

    #[test]
    fn test_conflict_display_names_both_ids() {
        let err = RegistryError::Conflict {
            scope_id: "Car".into(),
            object_id: "7".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Car"));
        assert!(msg.contains("7"));
    }

    #[test]
    fn test_invalid_argument_constructor() {
        let err = RegistryError::invalid_argument("Object id must not be empty");
        assert_eq!(err.to_string(), "Invalid argument: Object id must not be empty");
    }
}
