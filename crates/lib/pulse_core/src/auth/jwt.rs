// @zen-component: AUTH-TokenService
//
//! JWT token generation and verification.
//!
//! Access and refresh tokens are HS256 JWTs signed with two independent
//! secrets. Expiry is judged against the injected clock, so jsonwebtoken's
//! own wall-clock `exp` check is switched off.

use std::path::{Path, PathBuf};

use chrono::Duration;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::AuthError;
use crate::clock::SharedClock;
use crate::config::TokenSecrets;
use crate::models::auth::{AccessClaims, CredentialRecord, RefreshClaims, TokenPair};

/// Length of generated secrets.
const GENERATED_SECRET_LEN: usize = 64;

/// Why a token failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("token invalid")]
    Invalid,
}

/// Mints and verifies token pairs. Holds no mutable state.
pub struct TokenService {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
    clock: SharedClock,
}

impl TokenService {
    pub fn new(
        secrets: &TokenSecrets,
        access_ttl: Duration,
        refresh_ttl: Duration,
        clock: SharedClock,
    ) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(secrets.access.as_bytes()),
            access_decoding: DecodingKey::from_secret(secrets.access.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(secrets.refresh.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(secrets.refresh.as_bytes()),
            access_ttl,
            refresh_ttl,
            clock,
        }
    }

    /// Access token lifetime.
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Mint a fresh access/refresh pair for `credential`.
    pub fn issue(&self, credential: &CredentialRecord) -> Result<TokenPair, AuthError> {
        let now = self.clock.utc();
        let iat = now.timestamp();
        let expiry = |ttl: Duration| {
            now.checked_add_signed(ttl)
                .map(|at| at.timestamp())
                .ok_or_else(|| AuthError::Internal("token expiry out of range".into()))
        };

        let access = AccessClaims {
            sub: credential.email.clone(),
            department: credential.department,
            is_admin: credential.is_admin,
            iat,
            exp: expiry(self.access_ttl)?,
            jti: Uuid::new_v4().to_string(),
        };
        let refresh = RefreshClaims {
            sub: credential.email.clone(),
            department: credential.department,
            iat,
            exp: expiry(self.refresh_ttl)?,
            jti: Uuid::new_v4().to_string(),
        };

        Ok(TokenPair {
            access_token: sign(&access, &self.access_encoding)?,
            refresh_token: sign(&refresh, &self.refresh_encoding)?,
            expires_in: self.access_ttl.num_seconds(),
        })
    }

    /// Verify an access token, distinguishing expiry from forgery.
    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let claims: AccessClaims = decode_claims(token, &self.access_decoding)?;
        if self.is_expired(claims.exp) {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    /// Verify a refresh token. An expired refresh token is simply invalid.
    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        let claims: RefreshClaims = decode_claims(token, &self.refresh_decoding)?;
        if self.is_expired(claims.exp) {
            return Err(TokenError::Invalid);
        }
        Ok(claims)
    }

    fn is_expired(&self, exp: i64) -> bool {
        self.clock.utc().timestamp() >= exp
    }
}

fn sign<C: Serialize>(claims: &C, key: &EncodingKey) -> Result<String, AuthError> {
    encode(&Header::new(Algorithm::HS256), claims, key)
        .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))
}

fn decode_claims<C: DeserializeOwned>(token: &str, key: &DecodingKey) -> Result<C, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.set_required_spec_claims(&["exp", "sub"]);
    decode::<C>(token, key, &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            debug!(error = %e, "token rejected");
            TokenError::Invalid
        })
}

/// SHA-256 digest of a token, used wherever a token must be remembered.
pub fn token_digest(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Resolve both signing secrets.
///
/// Access: `JWT_SECRET` → `AUTH_SECRET` → persisted file.
/// Refresh: `JWT_REFRESH_SECRET` → persisted file.
/// Generated secrets are random, so they never coincide.
pub fn resolve_token_secrets() -> TokenSecrets {
    let dir = secrets_dir();
    let access = env_secret(&["JWT_SECRET", "AUTH_SECRET"])
        .unwrap_or_else(|| load_or_generate_secret(&dir.join("access-secret")));
    let refresh = env_secret(&["JWT_REFRESH_SECRET"])
        .unwrap_or_else(|| load_or_generate_secret(&dir.join("refresh-secret")));
    TokenSecrets::new(access, refresh)
}

fn env_secret(vars: &[&str]) -> Option<String> {
    vars.iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|secret| !secret.is_empty())
}

/// Read a persisted secret, generating and persisting one if absent.
pub fn load_or_generate_secret(path: &Path) -> String {
    if let Ok(existing) = std::fs::read_to_string(path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    let secret: String = rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_SECRET_LEN)
        .map(char::from)
        .collect();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    match std::fs::write(path, &secret) {
        Ok(()) => info!(path = %path.display(), "generated new token secret"),
        Err(e) => warn!(path = %path.display(), error = %e, "could not persist token secret"),
    }
    secret
}

/// Directory holding persisted secrets.
fn secrets_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("skills-pulse")
}
