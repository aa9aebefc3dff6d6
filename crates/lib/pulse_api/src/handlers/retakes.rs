// @zen-component: RETAKE-Endpoints
//
//! Retake status, start and completion handlers. Callers may only act on
//! their own records unless they are admins.

use axum::Json;
use axum::extract::{Path, State};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{MessageResponse, RetakeStatusResponse, StartRetakeRequest, StartRetakeResponse};

/// `GET /api/users/{email}/quizzes/{quiz}/retake`
pub async fn retake_status_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path((email, quiz)): Path<(String, String)>,
) -> AppResult<Json<RetakeStatusResponse>> {
    user.require_self_or_admin(&email)?;
    let status = state.retakes.status(&email, &quiz)?;
    Ok(Json(status.into()))
}

/// `POST /api/users/{email}/quizzes/{quiz}/retake/start`
pub async fn start_retake_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path((email, quiz)): Path<(String, String)>,
    Json(body): Json<StartRetakeRequest>,
) -> AppResult<Json<StartRetakeResponse>> {
    user.require_self_or_admin(&email)?;
    let score = body
        .score
        .ok_or_else(|| AppError::Validation("score is required".into()))?;
    if state.auth.credential(&email)?.is_none() {
        return Err(AppError::NotFound("User not found".into()));
    }

    let started = state.retakes.start(&email, &quiz, score)?;
    Ok(Json(StartRetakeResponse {
        message: "Retake cooldown started".into(),
        cooldown_until: started.cooldown_until,
        attempts_remaining: started.attempts_remaining,
    }))
}

/// `POST /api/users/{email}/quizzes/{quiz}/retake/complete`
pub async fn complete_retake_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path((email, quiz)): Path<(String, String)>,
) -> AppResult<Json<MessageResponse>> {
    user.require_self_or_admin(&email)?;
    state.retakes.complete(&email, &quiz)?;
    Ok(Json(MessageResponse {
        message: "Retake marked as completed".into(),
    }))
}
