// @zen-component: CFG-AuthSettings
//
//! Tunables for the token, session and retake subsystems.

use std::fmt;

use chrono::Duration;
use thiserror::Error;

/// Access token lifetime: 15 minutes.
pub const ACCESS_TOKEN_TTL_SECS: i64 = 15 * 60;

/// Refresh token lifetime: 7 days.
pub const REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Idle time after which a session is dead regardless of token validity: 30 minutes.
pub const SESSION_INACTIVITY_TIMEOUT_SECS: i64 = 30 * 60;

/// Scores strictly below this percentage qualify for a retake.
pub const RETAKE_SCORE_THRESHOLD: f64 = 45.0;

/// Mandatory cool-off before a retake: 30 minutes.
pub const RETAKE_COOLDOWN_SECS: i64 = 30 * 60;

/// Retakes ever granted per (user, quiz).
pub const MAX_RETAKE_ATTEMPTS: u32 = 1;

/// Password resets allowed per calendar month.
pub const MAX_MONTHLY_PASSWORD_RESETS: u32 = 3;

/// bcrypt cost factor for new hashes.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Minimum accepted password length on registration and reset.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Email domain new registrations must belong to.
pub const DEFAULT_ALLOWED_EMAIL_DOMAIN: &str = "bdo.co.zw";

/// Longest accepted TTL, timeout or cooldown: 10 years.
pub const MAX_DURATION_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// Configuration errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing secret: {0}")]
    MissingSecret(&'static str),

    #[error("Access and refresh token secrets must differ")]
    SharedSecret,

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

/// The two independent token signing secrets.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenSecrets {
    pub access: String,
    pub refresh: String,
}

impl TokenSecrets {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }
}

impl fmt::Debug for TokenSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSecrets")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .finish()
    }
}

/// Settings for the authenticator, token service and session registry.
#[derive(Clone, Debug)]
pub struct AuthSettings {
    pub secrets: TokenSecrets,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub inactivity_timeout: Duration,
    pub bcrypt_cost: u32,
    /// `None` accepts registrations from any domain.
    pub allowed_email_domain: Option<String>,
    pub max_monthly_password_resets: u32,
}

impl AuthSettings {
    /// Default lifetimes and limits around the given secrets.
    pub fn new(secrets: TokenSecrets) -> Self {
        Self {
            secrets,
            access_ttl: Duration::seconds(ACCESS_TOKEN_TTL_SECS),
            refresh_ttl: Duration::seconds(REFRESH_TOKEN_TTL_SECS),
            inactivity_timeout: Duration::seconds(SESSION_INACTIVITY_TIMEOUT_SECS),
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            allowed_email_domain: Some(DEFAULT_ALLOWED_EMAIL_DOMAIN.to_string()),
            max_monthly_password_resets: MAX_MONTHLY_PASSWORD_RESETS,
        }
    }

    /// Reject settings the services cannot run safely with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secrets.access.trim().is_empty() {
            return Err(ConfigError::MissingSecret("JWT_SECRET"));
        }
        if self.secrets.refresh.trim().is_empty() {
            return Err(ConfigError::MissingSecret("JWT_REFRESH_SECRET"));
        }
        if self.secrets.access == self.secrets.refresh {
            return Err(ConfigError::SharedSecret);
        }
        bounded("ACCESS_TOKEN_TTL_SECS", self.access_ttl)?;
        bounded("REFRESH_TOKEN_TTL_SECS", self.refresh_ttl)?;
        bounded("SESSION_INACTIVITY_TIMEOUT_SECS", self.inactivity_timeout)?;
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(ConfigError::InvalidValue {
                key: "BCRYPT_COST",
                reason: format!("{} is outside 4..=31", self.bcrypt_cost),
            });
        }
        Ok(())
    }
}

/// Rules of the retake gate.
#[derive(Clone, Debug, PartialEq)]
pub struct RetakePolicy {
    pub score_threshold: f64,
    pub cooldown: Duration,
    pub max_attempts: u32,
}

impl RetakePolicy {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.score_threshold.is_finite() || !(0.0..=100.0).contains(&self.score_threshold) {
            return Err(ConfigError::InvalidValue {
                key: "RETAKE_SCORE_THRESHOLD",
                reason: format!("{} is not a percentage", self.score_threshold),
            });
        }
        bounded("RETAKE_COOLDOWN_SECS", self.cooldown)
    }
}

impl Default for RetakePolicy {
    fn default() -> Self {
        Self {
            score_threshold: RETAKE_SCORE_THRESHOLD,
            cooldown: Duration::seconds(RETAKE_COOLDOWN_SECS),
            max_attempts: MAX_RETAKE_ATTEMPTS,
        }
    }
}

fn bounded(key: &'static str, value: Duration) -> Result<(), ConfigError> {
    if value <= Duration::zero() {
        return Err(ConfigError::InvalidValue {
            key,
            reason: "must be greater than zero".into(),
        });
    }
    if value > Duration::seconds(MAX_DURATION_SECS) {
        return Err(ConfigError::InvalidValue {
            key,
            reason: format!("must not exceed {MAX_DURATION_SECS} seconds"),
        });
    }
    Ok(())
}
