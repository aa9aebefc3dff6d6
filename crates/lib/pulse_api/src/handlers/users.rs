//! User administration handlers.

use axum::Json;
use axum::extract::{Path, State};

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::ElevateResponse;

/// `POST /api/users/{email}/elevate`: grant admin. Admin callers only.
pub async fn elevate_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(email): Path<String>,
) -> AppResult<Json<ElevateResponse>> {
    let record = state.auth.elevate(&user.claims, &email)?;
    Ok(Json(ElevateResponse {
        message: "User elevated to administrator status successfully".into(),
        email: record.email,
        is_admin: record.is_admin,
    }))
}
