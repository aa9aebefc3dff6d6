// @zen-component: AUTH-LoginEndpoint
// @zen-component: AUTH-TokenRefreshEndpoint
// @zen-component: AUTH-SessionEndpoints
//
//! Authentication request handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use super::{blocking, required};
use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    LoginRequest, LoginResponse, LogoutResponse, RefreshRequest, RegisterRequest,
    RegisterResponse, SessionStatusResponse, SessionUser, TokenResponse,
};

/// `POST /api/register`: create a non-admin account.
pub async fn register_handler(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    const MISSING: &str = "Email, password and department are required";
    let email = required(body.email, MISSING)?;
    let password = required(body.password, MISSING)?;
    let department = required(body.department, MISSING)?;

    let record = blocking(&state.auth, move |auth| {
        auth.register(&email, &password, &department)
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".into(),
            email: record.email,
            department: record.department.to_string(),
            is_admin: record.is_admin,
        }),
    ))
}

/// `POST /api/login`: authenticate with email + password.
pub async fn login_handler(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    const MISSING: &str = "Email and password are required";
    let email = required(body.email, MISSING)?;
    let password = required(body.password, MISSING)?;

    let outcome = blocking(&state.auth, move |auth| auth.login(&email, &password)).await?;
    Ok(Json(LoginResponse {
        email: outcome.email,
        department: outcome.department.to_string(),
        is_admin: outcome.is_admin,
        access_token: outcome.tokens.access_token,
        refresh_token: outcome.tokens.refresh_token,
        expires_in: outcome.tokens.expires_in,
    }))
}

/// `POST /api/refresh`: exchange a refresh token for a new token pair.
pub async fn refresh_handler(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> AppResult<Json<TokenResponse>> {
    let refresh_token = body.refresh_token.unwrap_or_default();
    let tokens = state.auth.refresh(&refresh_token)?;
    Ok(Json(TokenResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_in: tokens.expires_in,
    }))
}

/// `POST /api/logout`: end the caller's current session.
pub async fn logout_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
) -> AppResult<Json<LogoutResponse>> {
    state.auth.logout(&user.claims, &user.access_token)?;
    Ok(Json(LogoutResponse {
        success: true,
        message: "Logged out successfully".into(),
    }))
}

/// `POST /api/logout-all`: end every session of the caller.
pub async fn logout_all_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
) -> AppResult<Json<LogoutResponse>> {
    state.auth.logout_all(user.email())?;
    Ok(Json(LogoutResponse {
        success: true,
        message: "Logged out from all devices successfully".into(),
    }))
}

/// `GET /api/session-status`: report remaining idle time without extending it.
pub async fn session_status_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
) -> AppResult<Json<SessionStatusResponse>> {
    let status = state.auth.session_status(&user.claims, &user.access_token)?;
    Ok(Json(SessionStatusResponse {
        valid: true,
        user: SessionUser {
            email: status.email,
            department: status.department.to_string(),
            is_admin: status.is_admin,
        },
        time_until_expiry: status.time_until_expiry.num_milliseconds(),
    }))
}
