//! Request handlers.

pub mod auth;
pub mod health;
pub mod password_reset;
pub mod responses;
pub mod retakes;
pub mod users;

use std::sync::Arc;

use pulse_core::auth::AuthError;
use pulse_core::auth::authenticator::Authenticator;

use crate::error::AppError;

/// Run a bcrypt-heavy authenticator call off the async workers.
pub(crate) async fn blocking<T, F>(auth: &Arc<Authenticator>, f: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&Authenticator) -> Result<T, AuthError> + Send + 'static,
{
    let auth = Arc::clone(auth);
    tokio::task::spawn_blocking(move || f(&auth))
        .await
        .map_err(|e| AppError::Internal(format!("blocking task: {e}")))?
        .map_err(AppError::from)
}

/// Unwrap a required body field.
pub(crate) fn required(value: Option<String>, message: &str) -> Result<String, AppError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Validation(message.to_string()))
}
