//! Quiz response submission.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use pulse_core::clock::Clock;
use tracing::info;
use uuid::Uuid;

use super::required;
use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{SubmitResponseRequest, SubmitResponseResponse};

/// `POST /api/responses`: record a scored attempt, arming a retake
/// cooldown when the score fails.
pub async fn submit_response_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Json(body): Json<SubmitResponseRequest>,
) -> AppResult<(StatusCode, Json<SubmitResponseResponse>)> {
    let user_email = required(body.user_email, "userEmail is required")?;
    let quiz_id = required(body.quiz_id, "quizId is required")?;
    let score = body
        .score
        .ok_or_else(|| AppError::Validation("score is required".into()))?;
    user.require_self_or_admin(&user_email)?;

    let retake = state
        .retakes
        .record_submission(&user_email, &quiz_id, score)?;
    let id = format!("response-{}", Uuid::new_v4());
    info!(response_id = %id, user = %user_email, quiz = %quiz_id, score, "response recorded");

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponseResponse {
            id,
            user_email,
            quiz_id,
            score,
            time_spent: body.time_spent,
            completed_at: body.completed_at.unwrap_or_else(|| state.clock.utc()),
            retake: retake.map(Into::into),
        }),
    ))
}
