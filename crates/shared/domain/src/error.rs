//! Domain-level errors.
//!
//! Raised by entity methods when a field or transition rule is broken.
//! Lookups and uniqueness are the services' concern and never show up here.

use thiserror::Error;

/// Rule violations detected on a single entity.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A field value is out of range or inconsistent with another field
    #[error("Validation error: {0}")]
    Validation(String),

    /// Plain-text password rejected before hashing
    #[error("Password error: {0}")]
    Password(String),

    /// Transition not permitted from the entity's current state
    #[error("{0}")]
    InvalidState(String),

    /// Account cannot be used to sign in
    #[error("Unauthorized")]
    Unauthorized,

    /// Receipt requested for a payment that cannot have one
    #[error("{0}")]
    InvalidReceipt(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    pub fn password(msg: impl Into<String>) -> Self {
        DomainError::Password(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        DomainError::InvalidState(msg.into())
    }

    pub fn invalid_receipt(msg: impl Into<String>) -> Self {
        DomainError::InvalidReceipt(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        DomainError::Internal(msg.into())
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
