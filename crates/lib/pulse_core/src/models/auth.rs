//! Authentication domain models.
//!
//! These are internal domain models, distinct from the HTTP DTOs in
//! `pulse_api::models` (which carry the camelCase wire names).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::Record;

/// Business unit a user belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Department {
    Tax,
    #[serde(rename = "IT")]
    It,
    Audit,
    Consulting,
}

impl Department {
    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Tax => "Tax",
            Department::It => "IT",
            Department::Audit => "Audit",
            Department::Consulting => "Consulting",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a department name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDepartment(pub String);

impl fmt::Display for UnknownDepartment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown department '{}'", self.0)
    }
}

impl std::error::Error for UnknownDepartment {}

impl FromStr for Department {
    type Err = UnknownDepartment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tax" => Ok(Department::Tax),
            "it" => Ok(Department::It),
            "audit" => Ok(Department::Audit),
            "consulting" => Ok(Department::Consulting),
            _ => Err(UnknownDepartment(s.to_string())),
        }
    }
}

/// Stored credential for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRecord {
    pub email: String,
    pub password_hash: String,
    pub department: Department,
    #[serde(default)]
    pub is_admin: bool,
}

impl Record for CredentialRecord {
    type Key = String;

    fn key(&self) -> String {
        self.email.clone()
    }

    fn owner(&self) -> &str {
        &self.email
    }
}

/// JWT claims embedded in access tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject: user email (standard JWT `sub` claim).
    pub sub: String,
    pub department: Department,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiry (unix timestamp).
    pub exp: i64,
    /// Unique token id.
    pub jti: String,
}

/// JWT claims embedded in refresh tokens. No privilege information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,
    pub department: Department,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// A freshly minted access/refresh token pair.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Server-side record of one authenticated client.
///
/// Only SHA-256 digests of the tokens are kept.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub id: String,
    pub email: String,
    pub access_digest: String,
    pub refresh_digest: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl Record for SessionRecord {
    type Key = String;

    fn key(&self) -> String {
        self.id.clone()
    }

    fn owner(&self) -> &str {
        &self.email
    }
}

/// Password reset bookkeeping for one user.
#[derive(Debug, Clone, PartialEq)]
pub struct PasswordResetRecord {
    pub email: String,
    pub reset_count: u32,
    pub monthly_count: u32,
    /// Start of the calendar month `monthly_count` refers to.
    pub window_start: DateTime<Utc>,
    pub last_reset: Option<DateTime<Utc>>,
}

impl Record for PasswordResetRecord {
    type Key = String;

    fn key(&self) -> String {
        self.email.clone()
    }

    fn owner(&self) -> &str {
        &self.email
    }
}
