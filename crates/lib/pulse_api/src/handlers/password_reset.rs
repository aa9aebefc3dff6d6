//! Password reset quota and reset handlers.

use axum::Json;
use axum::extract::{Path, State};

use super::{blocking, required};
use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{MessageResponse, ResetEligibilityResponse, ResetPasswordRequest};

/// `GET /api/password-reset/check/{email}`: monthly reset eligibility.
pub async fn check_handler(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<Json<ResetEligibilityResponse>> {
    let eligibility = state.auth.password_reset_eligibility(&email)?;
    Ok(Json(eligibility.into()))
}

/// `POST /api/password-reset/reset`: replace a password. Self or admin.
pub async fn reset_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Json(body): Json<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    const MISSING: &str = "Email and new password are required";
    let email = required(body.email, MISSING)?;
    let new_password = required(body.new_password, MISSING)?;

    blocking(&state.auth, move |auth| {
        auth.reset_password(&user.claims, &email, &new_password)
    })
    .await?;
    Ok(Json(MessageResponse {
        message: "Password reset successfully".into(),
    }))
}
