//! Application error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use pulse_core::auth::AuthError;
use pulse_core::retake::RetakeError;

use crate::models::ErrorResponse;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Missing credentials, or a subject/session that no longer exists.
    #[error("{0}")]
    Unauthenticated(String),

    /// Malformed or forged bearer token. Carries no detail.
    #[error("Invalid token")]
    InvalidToken,

    #[error("Access token expired")]
    TokenExpired,

    #[error("Invalid refresh token")]
    InvalidRefresh,

    #[error("Session expired due to inactivity")]
    SessionExpired,

    #[error("{0}")]
    Forbidden(String),

    #[error("User is already an administrator")]
    AlreadyAdmin,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    RetakeNotEligible(String),

    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::AlreadyAdmin | AppError::RetakeNotEligible(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::InvalidCredentials
            | AppError::Unauthenticated(_)
            | AppError::TokenExpired
            | AppError::SessionExpired => StatusCode::UNAUTHORIZED,
            AppError::InvalidToken | AppError::InvalidRefresh | AppError::Forbidden(_) => {
                StatusCode::FORBIDDEN
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code clients branch on.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::Unauthenticated(_) | AppError::InvalidToken => "UNAUTHENTICATED",
            AppError::TokenExpired => "TOKEN_EXPIRED",
            AppError::InvalidRefresh => "INVALID_REFRESH",
            AppError::SessionExpired => "SESSION_EXPIRED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::AlreadyAdmin => "ALREADY_ADMIN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::RetakeNotEligible(_) => "RETAKE_NOT_ELIGIBLE",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal(detail) = &self {
            error!(detail = %detail, "request failed");
        }
        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
        });
        (self.status(), body).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => AppError::InvalidCredentials,
            AuthError::Unauthenticated => AppError::Unauthenticated("Access token required".into()),
            AuthError::MissingRefresh => {
                AppError::Unauthenticated("Refresh token required".into())
            }
            AuthError::InvalidToken => AppError::InvalidToken,
            AuthError::TokenExpired => AppError::TokenExpired,
            AuthError::InvalidRefresh => AppError::InvalidRefresh,
            AuthError::SessionExpired => AppError::SessionExpired,
            AuthError::SessionRejected(msg) => AppError::Unauthenticated(msg),
            AuthError::Forbidden(msg) => AppError::Forbidden(msg),
            AuthError::AlreadyAdmin => AppError::AlreadyAdmin,
            AuthError::NotFound(msg) => AppError::NotFound(msg),
            AuthError::ValidationError(msg) => AppError::Validation(msg),
            AuthError::Conflict(msg) => AppError::Conflict(msg),
            AuthError::ResetLimitExceeded => {
                AppError::Validation("Monthly reset limit exceeded".into())
            }
            AuthError::Store(e) => AppError::Internal(e.to_string()),
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<RetakeError> for AppError {
    fn from(e: RetakeError) -> Self {
        match e {
            RetakeError::NotEligible(msg) => AppError::RetakeNotEligible(msg),
            RetakeError::NotFound(msg) => AppError::NotFound(msg),
            e @ RetakeError::InvalidScore(_) => AppError::Validation(e.to_string()),
            RetakeError::Store(e) => AppError::Internal(e.to_string()),
            e @ RetakeError::CooldownOverflow => AppError::Internal(e.to_string()),
        }
    }
}
