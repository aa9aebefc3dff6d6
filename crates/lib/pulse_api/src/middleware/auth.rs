// @zen-component: AUTH-AccessControl
//
//! Authentication middleware: bearer token extraction and verification.

use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use pulse_core::models::auth::AccessClaims;

use crate::AppState;
use crate::error::AppError;

/// Verified caller, stored in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub claims: AccessClaims,
    /// The raw bearer token, needed to find the caller's session.
    pub access_token: String,
}

impl AuthenticatedUser {
    pub fn email(&self) -> &str {
        &self.claims.sub
    }

    /// Whether the caller may act on `email`'s records.
    pub fn may_act_for(&self, email: &str) -> bool {
        self.claims.is_admin || self.claims.sub == email
    }

    pub fn require_self_or_admin(&self, email: &str) -> Result<(), AppError> {
        if self.may_act_for(email) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Cannot access another user's records".into(),
            ))
        }
    }
}

/// Axum middleware: extracts `Authorization: Bearer <token>`, verifies it,
/// and injects [`AuthenticatedUser`] into request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let bearer = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string);

    let claims = state.auth.authorize(bearer.as_deref())?;
    let access_token = bearer.unwrap_or_default().trim().to_string();

    request.extensions_mut().insert(AuthenticatedUser {
        claims,
        access_token,
    });
    Ok(next.run(request).await)
}
