//! # DomainError
//!
//! Centralized error type for the PixHub domain.
//! Every port and service returns [`DomainResult`]; adapters translate their
//! own failures into one of these variants at the boundary.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Entity kind and the identifier that was looked up.
    #[error("{0} not found: {1}")]
    NotFound(&'static str, String),

    /// Malformed or incomplete input (e.g. blank title, unknown plan).
    #[error("validation error: {0}")]
    Validation(String),

    /// Uniqueness or state conflict (duplicate slug, payment already reviewed).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The caller needs an active premium entitlement for this action.
    #[error("premium required: {0}")]
    PremiumRequired(String),

    /// Infrastructure failure (database down, hashing failure).
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound(entity, id.to_string())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

pub type DomainResult<T> = std::result::Result<T, DomainError>;
