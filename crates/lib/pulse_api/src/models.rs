//! Request and response bodies. Field names are camelCase on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pulse_core::auth::password_reset::ResetEligibility;
use pulse_core::models::retake::RetakeStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Fields are optional so an absent field is a 400, not a 422.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub department: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    pub email: String,
    pub department: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub email: String,
    pub department: String,
    pub is_admin: bool,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub email: String,
    pub department: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub valid: bool,
    pub user: SessionUser,
    /// Milliseconds of idle time left.
    pub time_until_expiry: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElevateResponse {
    pub message: String,
    pub email: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponseRequest {
    pub user_email: Option<String>,
    pub quiz_id: Option<String>,
    pub score: Option<f64>,
    pub time_spent: Option<u64>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponseResponse {
    pub id: String,
    pub user_email: String,
    pub quiz_id: String,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_spent: Option<u64>,
    pub completed_at: DateTime<Utc>,
    /// Present when the score armed (or met) a retake cooldown.
    pub retake: Option<RetakeStatusResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetakeStatusResponse {
    pub attempts: u32,
    pub cooldown_until: Option<DateTime<Utc>>,
    pub can_retake: bool,
}

impl From<RetakeStatus> for RetakeStatusResponse {
    fn from(status: RetakeStatus) -> Self {
        Self {
            attempts: status.attempts,
            cooldown_until: status.cooldown_until,
            can_retake: status.can_retake,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartRetakeRequest {
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRetakeResponse {
    pub message: String,
    pub cooldown_until: DateTime<Utc>,
    pub attempts_remaining: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetEligibilityResponse {
    pub can_reset: bool,
    pub remaining_resets: u32,
    pub monthly_count: u32,
    pub next_reset_date: DateTime<Utc>,
}

impl From<ResetEligibility> for ResetEligibilityResponse {
    fn from(e: ResetEligibility) -> Self {
        Self {
            can_reset: e.can_reset,
            remaining_resets: e.remaining_resets,
            monthly_count: e.monthly_count,
            next_reset_date: e.next_reset_date,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: Option<String>,
    pub new_password: Option<String>,
}
