//! API server configuration.

use std::path::PathBuf;
use std::str::FromStr;

use chrono::Duration;
use pulse_core::auth::jwt::resolve_token_secrets;
use pulse_core::config::{AuthSettings, ConfigError, RetakePolicy};

/// Default interval between idle-session sweeps.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3001").
    pub bind_addr: String,
    pub auth: AuthSettings,
    pub retake: RetakePolicy,
    /// YAML credential seed loaded at startup.
    pub credentials_file: Option<PathBuf>,
    pub sweep_interval: std::time::Duration,
}

impl ApiConfig {
    /// Defaults around the given settings; used by tests and embedders.
    pub fn new(auth: AuthSettings) -> Self {
        Self {
            bind_addr: "127.0.0.1:3001".into(),
            auth,
            retake: RetakePolicy::default(),
            credentials_file: None,
            sweep_interval: std::time::Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }

    /// Reads configuration from environment variables.
    ///
    /// | Variable                           | Default                       |
    /// |------------------------------------|-------------------------------|
    /// | `BIND_ADDR`                        | `127.0.0.1:3001`              |
    /// | `JWT_SECRET` / `AUTH_SECRET`       | generated & persisted to file |
    /// | `JWT_REFRESH_SECRET`               | generated & persisted to file |
    /// | `ACCESS_TOKEN_TTL_SECS`            | 900                           |
    /// | `REFRESH_TOKEN_TTL_SECS`           | 604800                        |
    /// | `SESSION_INACTIVITY_TIMEOUT_SECS`  | 1800                          |
    /// | `RETAKE_SCORE_THRESHOLD`           | 45                            |
    /// | `RETAKE_COOLDOWN_SECS`             | 1800                          |
    /// | `MAX_RETAKE_ATTEMPTS`              | 1                             |
    /// | `MAX_MONTHLY_PASSWORD_RESETS`      | 3                             |
    /// | `BCRYPT_COST`                      | 10                            |
    /// | `ALLOWED_EMAIL_DOMAIN`             | `bdo.co.zw` (empty disables)  |
    /// | `CREDENTIALS_FILE`                 | unset                         |
    /// | `SESSION_SWEEP_INTERVAL_SECS`      | 60                            |
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new(AuthSettings::new(resolve_token_secrets()));
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Overlay values from `lookup` and validate the result.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let seconds = |key: &'static str| parse_seconds(key, lookup(key));

        if let Some(addr) = lookup("BIND_ADDR").filter(|v| !v.is_empty()) {
            self.bind_addr = addr;
        }
        if let Some(ttl) = seconds("ACCESS_TOKEN_TTL_SECS")? {
            self.auth.access_ttl = ttl;
        }
        if let Some(ttl) = seconds("REFRESH_TOKEN_TTL_SECS")? {
            self.auth.refresh_ttl = ttl;
        }
        if let Some(ttl) = seconds("SESSION_INACTIVITY_TIMEOUT_SECS")? {
            self.auth.inactivity_timeout = ttl;
        }
        if let Some(cost) = parse_var("BCRYPT_COST", lookup("BCRYPT_COST"))? {
            self.auth.bcrypt_cost = cost;
        }
        if let Some(limit) = parse_var(
            "MAX_MONTHLY_PASSWORD_RESETS",
            lookup("MAX_MONTHLY_PASSWORD_RESETS"),
        )? {
            self.auth.max_monthly_password_resets = limit;
        }
        if let Some(domain) = lookup("ALLOWED_EMAIL_DOMAIN") {
            let domain = domain.trim().to_string();
            self.auth.allowed_email_domain = (!domain.is_empty()).then_some(domain);
        }

        if let Some(threshold) =
            parse_var("RETAKE_SCORE_THRESHOLD", lookup("RETAKE_SCORE_THRESHOLD"))?
        {
            self.retake.score_threshold = threshold;
        }
        if let Some(ttl) = seconds("RETAKE_COOLDOWN_SECS")? {
            self.retake.cooldown = ttl;
        }
        if let Some(max) = parse_var("MAX_RETAKE_ATTEMPTS", lookup("MAX_RETAKE_ATTEMPTS"))? {
            self.retake.max_attempts = max;
        }

        if let Some(path) = lookup("CREDENTIALS_FILE").filter(|v| !v.is_empty()) {
            self.credentials_file = Some(PathBuf::from(path));
        }
        if let Some(secs) = parse_var::<u64>(
            "SESSION_SWEEP_INTERVAL_SECS",
            lookup("SESSION_SWEEP_INTERVAL_SECS"),
        )? {
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    key: "SESSION_SWEEP_INTERVAL_SECS",
                    reason: "must be greater than zero".into(),
                });
            }
            self.sweep_interval = std::time::Duration::from_secs(secs);
        }

        self.auth.validate()?;
        self.retake.validate()
    }
}

/// Whole seconds as a duration; values chrono cannot represent are rejected.
fn parse_seconds(
    key: &'static str,
    raw: Option<String>,
) -> Result<Option<Duration>, ConfigError> {
    parse_var::<i64>(key, raw)?
        .map(|secs| {
            Duration::try_seconds(secs).ok_or_else(|| ConfigError::InvalidValue {
                key,
                reason: format!("{secs} seconds is out of range"),
            })
        })
        .transpose()
}

fn parse_var<T>(key: &'static str, raw: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                key,
                reason: format!("'{value}': {e}"),
            }),
    }
}
