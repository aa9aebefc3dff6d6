//! Authentication and authorization logic.
//!
//! Password hashing, token minting/verification, the session registry and
//! the [`authenticator::Authenticator`] that orchestrates them.

pub mod authenticator;
pub mod jwt;
pub mod password;
pub mod password_reset;
pub mod sessions;

use thiserror::Error;

use crate::store::StoreError;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password; the two are never distinguished.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// No bearer token was presented.
    #[error("Access token required")]
    Unauthenticated,

    /// Bearer token is malformed or carries a bad signature.
    #[error("Invalid token")]
    InvalidToken,

    /// Access token is well-formed but past its expiry; refresh may recover.
    #[error("Access token expired")]
    TokenExpired,

    #[error("Refresh token required")]
    MissingRefresh,

    #[error("Invalid refresh token")]
    InvalidRefresh,

    /// Session idled past the inactivity timeout and has been evicted.
    #[error("Session expired due to inactivity")]
    SessionExpired,

    /// The user or session behind a valid token no longer exists.
    #[error("{0}")]
    SessionRejected(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("User is already an administrator")]
    AlreadyAdmin,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Monthly password reset limit exceeded")]
    ResetLimitExceeded,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}
