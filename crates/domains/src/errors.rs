//! # DomainError
//!
//! Centralized error handling for the SiteBoard ecosystem.
//! Every port and service returns this type; only the API layer maps it to
//! transport status codes.

use thiserror::Error;
use uuid::Uuid;

/// The primary error type for all domain and service operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Site {0} not found")]
    SiteNotFound(Uuid),

    #[error("Comment {0} not found")]
    CommentNotFound(Uuid),

    /// No usable caller identity (missing, malformed or expired credential)
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Caller is known but lacks the ownership or role the operation needs
    #[error("{0}")]
    Forbidden(String),

    /// Malformed create/update payload
    #[error("validation error: {0}")]
    Validation(String),

    /// Stale revision on save, or a duplicate unique field
    #[error("conflict: {0}")]
    Conflict(String),

    /// Infrastructure failure (e.g., DB down, pool timeout)
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl DomainError {
    pub fn stale_site(id: Uuid) -> Self {
        Self::Conflict(format!(
            "Site {id} was modified concurrently; reload and retry"
        ))
    }
}

/// A specialized Result type for SiteBoard logic.
pub type Result<T> = std::result::Result<T, DomainError>;
