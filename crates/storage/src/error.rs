use thiserror::Error;

use crate::services::lifecycle::LifecycleError;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] argon2::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23505")
        )
    }

    /// Converts a unique violation into a `ConstraintViolation` carrying `message`,
    /// leaving every other error untouched.
    pub fn on_unique_violation(self, message: &str) -> Self {
        if self.is_unique_violation() {
            StorageError::ConstraintViolation(message.to_string())
        } else {
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_error_is_transparent() {
        let err = StorageError::from(LifecycleError::NotPermitted("nothing to submit to".into()));
        assert_eq!(err.to_string(), "Not permitted: nothing to submit to");
    }

    #[test]
    fn test_non_database_error_is_not_unique_violation() {
        assert!(!StorageError::NotFound.is_unique_violation());
        assert!(matches!(
            StorageError::NotFound.on_unique_violation("taken"),
            StorageError::NotFound
        ));
    }
}
