//! Storage failures and their mapping onto [`DomainError`].

use domains::{DomainError, DomainResult};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[cfg(feature = "db-sqlite")]
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),

    #[cfg(feature = "db-sqlite")]
    #[error("migration: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// A stored value no longer parses into its domain type.
    #[error("corrupt column {column}: {value:?}")]
    Decode { column: &'static str, value: String },
}

impl From<StorageError> for DomainError {
    fn from(err: StorageError) -> Self {
        match err {
            #[cfg(feature = "db-sqlite")]
            StorageError::Database(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                DomainError::Conflict(db.message().to_string())
            }
            #[cfg(feature = "db-sqlite")]
            StorageError::Database(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
                DomainError::Validation(db.message().to_string())
            }
            other => {
                tracing::error!(error = %other, "storage failure");
                DomainError::Internal(other.to_string())
            }
        }
    }
}

/// `.domain()` converts any storage-side result into a [`DomainResult`].
pub(crate) trait IntoDomain<T> {
    fn domain(self) -> DomainResult<T>;
}

impl<T, E: Into<StorageError>> IntoDomain<T> for Result<T, E> {
    fn domain(self) -> DomainResult<T> {
        self.map_err(|e| DomainError::from(e.into()))
    }
}
