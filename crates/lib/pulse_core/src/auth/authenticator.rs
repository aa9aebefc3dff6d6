// @zen-component: AUTH-Authenticator
//
//! Login, refresh, logout, session status, elevation, registration and
//! password reset, orchestrated over the credential store, the token service
//! and the session registry.

use std::sync::{Arc, LazyLock, Mutex, MutexGuard, OnceLock, PoisonError};

use chrono::Duration;
use regex::Regex;
use tracing::{debug, info, warn};

use super::AuthError;
use super::jwt::{TokenError, TokenService};
use super::password::{check_password_policy, hash_password, verify_password};
use super::password_reset::{PasswordResetLedger, ResetEligibility};
use super::sessions::SessionRegistry;
use crate::clock::SharedClock;
use crate::config::AuthSettings;
use crate::models::auth::{
    AccessClaims, CredentialRecord, Department, PasswordResetRecord, SessionRecord, TokenPair,
};
use crate::store::{MemoryStore, Store};

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub email: String,
    pub department: Department,
    pub is_admin: bool,
    pub tokens: TokenPair,
}

/// Live session summary for the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStatus {
    pub email: String,
    pub department: Department,
    pub is_admin: bool,
    /// Idle time left before the session expires.
    pub time_until_expiry: Duration,
}

/// The stores the authenticator works over.
pub struct AuthStores {
    pub credentials: Arc<dyn Store<CredentialRecord>>,
    pub sessions: Arc<dyn Store<SessionRecord>>,
    pub password_resets: Arc<dyn Store<PasswordResetRecord>>,
}

impl AuthStores {
    pub fn in_memory() -> Self {
        Self {
            credentials: Arc::new(MemoryStore::new()),
            sessions: Arc::new(MemoryStore::new()),
            password_resets: Arc::new(MemoryStore::new()),
        }
    }
}

pub struct Authenticator {
    credentials: Arc<dyn Store<CredentialRecord>>,
    tokens: TokenService,
    sessions: SessionRegistry,
    resets: PasswordResetLedger,
    bcrypt_cost: u32,
    allowed_email_domain: Option<String>,
    /// Hash verified against when the email is unknown, so both login
    /// failures cost one bcrypt verification.
    dummy_hash: OnceLock<String>,
    credential_lock: Mutex<()>,
}

impl Authenticator {
    pub fn new(settings: &AuthSettings, stores: AuthStores, clock: SharedClock) -> Self {
        Self {
            credentials: stores.credentials,
            tokens: TokenService::new(
                &settings.secrets,
                settings.access_ttl,
                settings.refresh_ttl,
                clock.clone(),
            ),
            sessions: SessionRegistry::new(
                stores.sessions,
                clock.clone(),
                settings.inactivity_timeout,
            ),
            resets: PasswordResetLedger::new(
                stores.password_resets,
                clock,
                settings.max_monthly_password_resets,
            ),
            bcrypt_cost: settings.bcrypt_cost,
            allowed_email_domain: settings
                .allowed_email_domain
                .as_ref()
                .map(|d| d.trim().to_ascii_lowercase())
                .filter(|d| !d.is_empty()),
            dummy_hash: OnceLock::new(),
            credential_lock: Mutex::new(()),
        }
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Credential for `email`, if one exists.
    pub fn credential(&self, email: &str) -> Result<Option<CredentialRecord>, AuthError> {
        Ok(self.credentials.get(&email.to_string())?)
    }

    /// Insert or replace a credential without validation. Used for seeding.
    pub fn upsert_credential(&self, record: CredentialRecord) -> Result<(), AuthError> {
        let _guard = self.lock_credentials();
        self.credentials.put(record)?;
        Ok(())
    }

    pub fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::ValidationError(
                "Email and password are required".into(),
            ));
        }

        let Some(credential) = self.credential(email)? else {
            let _ = verify_password(password, self.dummy_hash()?);
            debug!(email, "login for unknown email");
            return Err(AuthError::InvalidCredentials);
        };
        match verify_password(password, &credential.password_hash) {
            Ok(true) => {}
            Ok(false) => {
                debug!(email, "login with wrong password");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => {
                warn!(email, error = %e, "stored password hash is unusable");
                return Err(AuthError::InvalidCredentials);
            }
        }

        let tokens = self.tokens.issue(&credential)?;
        let session_id = self.sessions.register(&credential.email, &tokens)?;
        info!(email, session_id = %session_id, "user logged in");

        Ok(LoginOutcome {
            email: credential.email,
            department: credential.department,
            is_admin: credential.is_admin,
            tokens,
        })
    }

    /// Validate a bearer token. Does not touch the session.
    pub fn authorize(&self, bearer: Option<&str>) -> Result<AccessClaims, AuthError> {
        let token = bearer
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::Unauthenticated)?;
        self.tokens.verify_access(token).map_err(|e| match e {
            TokenError::Expired => AuthError::TokenExpired,
            TokenError::Invalid => AuthError::InvalidToken,
        })
    }

    /// Exchange a refresh token for a new pair, rotating the session.
    pub fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let refresh_token = refresh_token.trim();
        if refresh_token.is_empty() {
            return Err(AuthError::MissingRefresh);
        }
        let claims = self
            .tokens
            .verify_refresh(refresh_token)
            .map_err(|_| AuthError::InvalidRefresh)?;

        let Some(session) = self
            .sessions
            .find_by_refresh_token(&claims.sub, refresh_token)?
        else {
            return Err(AuthError::InvalidRefresh);
        };
        if !self.sessions.is_alive(&session.id)? {
            self.sessions.revoke(&session.id)?;
            info!(email = %claims.sub, "refresh on idle session");
            return Err(AuthError::SessionExpired);
        }

        // Re-read the credential so elevation shows up in the new claims.
        let credential = self
            .credential(&claims.sub)?
            .ok_or_else(|| AuthError::NotFound("User not found".into()))?;
        let tokens = self.tokens.issue(&credential)?;

        if !self.sessions.rotate(&session.id, refresh_token, &tokens)? {
            warn!(email = %claims.sub, "refresh token already rotated");
            return Err(AuthError::InvalidRefresh);
        }
        self.sessions.touch(&session.id)?;
        debug!(email = %claims.sub, session_id = %session.id, "tokens refreshed");
        Ok(tokens)
    }

    /// End the session bound to `access_token`. Absent sessions are fine.
    pub fn logout(&self, claims: &AccessClaims, access_token: &str) -> Result<(), AuthError> {
        if let Some(session) = self.sessions.find_by_access_token(&claims.sub, access_token)? {
            self.sessions.revoke(&session.id)?;
        }
        info!(email = %claims.sub, "user logged out");
        Ok(())
    }

    /// End every session of `email`.
    pub fn logout_all(&self, email: &str) -> Result<usize, AuthError> {
        let revoked = self.sessions.revoke_all(email)?;
        info!(email, revoked, "user logged out everywhere");
        Ok(revoked)
    }

    pub fn session_status(
        &self,
        claims: &AccessClaims,
        access_token: &str,
    ) -> Result<SessionStatus, AuthError> {
        let credential = self
            .credential(&claims.sub)?
            .ok_or_else(|| AuthError::SessionRejected("User not found".into()))?;
        let session = self
            .sessions
            .find_by_access_token(&claims.sub, access_token)?
            .ok_or_else(|| AuthError::SessionRejected("Session not found".into()))?;
        if !self.sessions.is_alive(&session.id)? {
            return Err(AuthError::SessionExpired);
        }

        Ok(SessionStatus {
            email: credential.email,
            department: credential.department,
            is_admin: credential.is_admin,
            time_until_expiry: self.sessions.idle_remaining(&session),
        })
    }

    /// Grant admin to `target`. Only admins may call this.
    pub fn elevate(
        &self,
        caller: &AccessClaims,
        target: &str,
    ) -> Result<CredentialRecord, AuthError> {
        if !caller.is_admin {
            return Err(AuthError::Forbidden("Admin privileges required".into()));
        }

        let _guard = self.lock_credentials();
        let mut credential = self
            .credential(target)?
            .ok_or_else(|| AuthError::NotFound("User not found".into()))?;
        if credential.is_admin {
            return Err(AuthError::AlreadyAdmin);
        }
        credential.is_admin = true;
        self.credentials.put(credential.clone())?;

        info!(target: "audit", actor = %caller.sub, subject = target, "user elevated to admin");
        Ok(credential)
    }

    /// Create a non-admin account.
    pub fn register(
        &self,
        email: &str,
        password: &str,
        department: &str,
    ) -> Result<CredentialRecord, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() || department.trim().is_empty() {
            return Err(AuthError::ValidationError(
                "Email, password and department are required".into(),
            ));
        }
        if !is_valid_email(email) {
            return Err(AuthError::ValidationError("Invalid email format".into()));
        }
        if let Some(domain) = &self.allowed_email_domain {
            let in_domain = email
                .rsplit_once('@')
                .is_some_and(|(_, d)| d.eq_ignore_ascii_case(domain));
            if !in_domain {
                return Err(AuthError::ValidationError(format!(
                    "Email must belong to the {domain} domain"
                )));
            }
        }
        check_password_policy(password)?;
        let department = department
            .parse::<Department>()
            .map_err(|e| AuthError::ValidationError(e.to_string()))?;

        let password_hash = hash_password(password, self.bcrypt_cost)?;
        let _guard = self.lock_credentials();
        if self.credential(email)?.is_some() {
            return Err(AuthError::Conflict("User already exists".into()));
        }
        let record = CredentialRecord {
            email: email.to_string(),
            password_hash,
            department,
            is_admin: false,
        };
        self.credentials.put(record.clone())?;
        info!(email, department = %department, "user registered");
        Ok(record)
    }

    pub fn password_reset_eligibility(&self, email: &str) -> Result<ResetEligibility, AuthError> {
        Ok(self.resets.check(email.trim())?)
    }

    /// Replace `email`'s password, counting against the monthly quota.
    pub fn reset_password(
        &self,
        caller: &AccessClaims,
        email: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let email = email.trim();
        if email.is_empty() || new_password.is_empty() {
            return Err(AuthError::ValidationError(
                "Email and new password are required".into(),
            ));
        }
        if caller.sub != email && !caller.is_admin {
            return Err(AuthError::Forbidden(
                "Cannot reset another user's password".into(),
            ));
        }
        check_password_policy(new_password)?;
        let password_hash = hash_password(new_password, self.bcrypt_cost)?;

        let _guard = self.lock_credentials();
        let mut credential = self
            .credential(email)?
            .ok_or_else(|| AuthError::NotFound("User not found".into()))?;
        if !self.resets.try_consume(email)? {
            return Err(AuthError::ResetLimitExceeded);
        }
        credential.password_hash = password_hash;
        self.credentials.put(credential)?;

        info!(target: "audit", actor = %caller.sub, subject = email, "password reset");
        Ok(())
    }

    /// Evict idle sessions; returns how many were removed.
    pub fn sweep_sessions(&self) -> Result<usize, AuthError> {
        Ok(self.sessions.sweep()?)
    }

    fn dummy_hash(&self) -> Result<&str, AuthError> {
        if let Some(hash) = self.dummy_hash.get() {
            return Ok(hash);
        }
        let hash = hash_password("not-a-real-password", self.bcrypt_cost)?;
        Ok(self.dummy_hash.get_or_init(|| hash))
    }

    fn lock_credentials(&self) -> MutexGuard<'_, ()> {
        self.credential_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

static EMAIL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());

fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.as_ref().is_some_and(|re| re.is_match(email))
}

#[cfg(test)]
mod tests {
    use std::sync::Barrier;

    use super::*;
    use crate::testing::{MutableClock, credential, shared, test_settings};

    fn authenticator(clock: &Arc<MutableClock>) -> Authenticator {
        let auth = Authenticator::new(&test_settings(), AuthStores::in_memory(), shared(clock));
        auth.upsert_credential(credential("a@x.com", "pw", Department::Tax, false))
            .unwrap();
        auth.upsert_credential(credential("root@x.com", "rootpw", Department::It, true))
            .unwrap();
        auth
    }

    #[test]
    fn login_returns_identity_and_tokens() {
        let clock = MutableClock::shared();
        let auth = authenticator(&clock);
        let outcome = auth.login("a@x.com", "pw").unwrap();
        assert_eq!(outcome.email, "a@x.com");
        assert_eq!(outcome.department, Department::Tax);
        assert!(!outcome.is_admin);
        assert_eq!(outcome.tokens.expires_in, 900);
        assert_eq!(auth.sessions().count_for("a@x.com").unwrap(), 1);
    }

    #[test]
    fn unknown_email_and_wrong_password_look_the_same() {
        let clock = MutableClock::shared();
        let auth = authenticator(&clock);
        let unknown = auth.login("nobody@x.com", "pw").unwrap_err();
        let wrong = auth.login("a@x.com", "nope").unwrap_err();
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[test]
    fn unusable_stored_hash_fails_like_a_wrong_password() {
        let clock = MutableClock::shared();
        let auth = authenticator(&clock);
        let mut broken = credential("c@x.com", "pw", Department::Audit, false);
        broken.password_hash = "$2b$x".into();
        auth.upsert_credential(broken).unwrap();

        let err = auth.login("c@x.com", "pw").unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert_eq!(
            err.to_string(),
            auth.login("nobody@x.com", "pw").unwrap_err().to_string()
        );
        assert_eq!(auth.sessions().count_for("c@x.com").unwrap(), 0);
    }

    #[test]
    fn email_shape_is_checked() {
        assert!(is_valid_email("user@bdo.co.zw"));
        assert!(!is_valid_email("user@localhost"));
        assert!(!is_valid_email("two@@x.com"));
        assert!(!is_valid_email("spaced out@x.com"));
    }

    #[test]
    fn login_requires_both_fields() {
        let clock = MutableClock::shared();
        let auth = authenticator(&clock);
        assert!(matches!(
            auth.login("", "pw"),
            Err(AuthError::ValidationError(_))
        ));
        assert!(matches!(
            auth.login("a@x.com", ""),
            Err(AuthError::ValidationError(_))
        ));
    }

    #[test]
    fn authorize_distinguishes_missing_expired_and_invalid() {
        let clock = MutableClock::shared();
        let auth = authenticator(&clock);
        let tokens = auth.login("a@x.com", "pw").unwrap().tokens;

        assert!(matches!(auth.authorize(None), Err(AuthError::Unauthenticated)));
        assert!(matches!(
            auth.authorize(Some("junk")),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            auth.authorize(Some(&tokens.refresh_token)),
            Err(AuthError::InvalidToken)
        ));
        assert_eq!(
            auth.authorize(Some(&tokens.access_token)).unwrap().sub,
            "a@x.com"
        );

        clock.advance_seconds(900);
        assert!(matches!(
            auth.authorize(Some(&tokens.access_token)),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn expired_access_recovers_through_refresh() {
        let clock = MutableClock::shared();
        let auth = authenticator(&clock);
        let tokens = auth.login("a@x.com", "pw").unwrap().tokens;

        clock.advance(Duration::minutes(16));
        assert!(matches!(
            auth.authorize(Some(&tokens.access_token)),
            Err(AuthError::TokenExpired)
        ));
        let fresh = auth.refresh(&tokens.refresh_token).unwrap();
        assert!(auth.authorize(Some(&fresh.access_token)).is_ok());
    }

    #[test]
    fn refresh_rotates_the_refresh_token() {
        let clock = MutableClock::shared();
        let auth = authenticator(&clock);
        let tokens = auth.login("a@x.com", "pw").unwrap().tokens;

        let next = auth.refresh(&tokens.refresh_token).unwrap();
        assert!(matches!(
            auth.refresh(&tokens.refresh_token),
            Err(AuthError::InvalidRefresh)
        ));
        assert!(auth.refresh(&next.refresh_token).is_ok());
    }

    #[test]
    fn concurrent_refresh_has_exactly_one_winner() {
        let clock = MutableClock::shared();
        let auth = authenticator(&clock);
        let tokens = auth.login("a@x.com", "pw").unwrap().tokens;
        let barrier = Barrier::new(2);
        let (auth, barrier) = (&auth, &barrier);
        let presented = tokens.refresh_token.as_str();

        let results: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..2)
                .map(|_| {
                    scope.spawn(move || {
                        barrier.wait();
                        auth.refresh(presented)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let wins = results.iter().filter(|r| r.is_ok()).count();
        let losses = results
            .iter()
            .filter(|r| matches!(r, Err(AuthError::InvalidRefresh)))
            .count();
        assert_eq!((wins, losses), (1, 1));
    }

    #[test]
    fn idle_session_cannot_refresh() {
        let clock = MutableClock::shared();
        let auth = authenticator(&clock);
        let tokens = auth.login("a@x.com", "pw").unwrap().tokens;

        clock.advance(Duration::minutes(31));
        assert!(matches!(
            auth.refresh(&tokens.refresh_token),
            Err(AuthError::SessionExpired)
        ));
        assert!(matches!(
            auth.refresh(&tokens.refresh_token),
            Err(AuthError::InvalidRefresh)
        ));
    }

    #[test]
    fn refresh_touches_the_session() {
        let clock = MutableClock::shared();
        let auth = authenticator(&clock);
        let tokens = auth.login("a@x.com", "pw").unwrap().tokens;

        clock.advance(Duration::minutes(25));
        let next = auth.refresh(&tokens.refresh_token).unwrap();
        clock.advance(Duration::minutes(25));
        assert!(auth.refresh(&next.refresh_token).is_ok());
    }

    #[test]
    fn empty_refresh_token_is_rejected() {
        let clock = MutableClock::shared();
        let auth = authenticator(&clock);
        assert!(matches!(auth.refresh("  "), Err(AuthError::MissingRefresh)));
    }

    #[test]
    fn logout_all_invalidates_every_refresh_token() {
        let clock = MutableClock::shared();
        let auth = authenticator(&clock);
        let first = auth.login("a@x.com", "pw").unwrap().tokens;
        let second = auth.login("a@x.com", "pw").unwrap().tokens;
        let other = auth.login("root@x.com", "rootpw").unwrap().tokens;

        assert_eq!(auth.logout_all("a@x.com").unwrap(), 2);
        for tokens in [&first, &second] {
            assert!(matches!(
                auth.refresh(&tokens.refresh_token),
                Err(AuthError::InvalidRefresh)
            ));
        }
        assert!(auth.refresh(&other.refresh_token).is_ok());
    }

    #[test]
    fn logout_ends_only_the_current_session() {
        let clock = MutableClock::shared();
        let auth = authenticator(&clock);
        let first = auth.login("a@x.com", "pw").unwrap().tokens;
        let second = auth.login("a@x.com", "pw").unwrap().tokens;

        let claims = auth.authorize(Some(&first.access_token)).unwrap();
        auth.logout(&claims, &first.access_token).unwrap();
        auth.logout(&claims, &first.access_token).unwrap();

        assert!(matches!(
            auth.refresh(&first.refresh_token),
            Err(AuthError::InvalidRefresh)
        ));
        assert!(auth.refresh(&second.refresh_token).is_ok());
    }

    #[test]
    fn session_status_reports_remaining_idle_time() {
        let clock = MutableClock::shared();
        let auth = authenticator(&clock);
        let tokens = auth.login("a@x.com", "pw").unwrap().tokens;
        let claims = auth.authorize(Some(&tokens.access_token)).unwrap();

        clock.advance(Duration::minutes(10));
        let status = auth.session_status(&claims, &tokens.access_token).unwrap();
        assert_eq!(status.email, "a@x.com");
        assert_eq!(status.time_until_expiry, Duration::minutes(20));

        // Status checks do not extend the session.
        clock.advance(Duration::minutes(10));
        let status = auth.session_status(&claims, &tokens.access_token).unwrap();
        assert_eq!(status.time_until_expiry, Duration::minutes(10));
    }

    #[test]
    fn session_status_after_timeout_expires_and_evicts() {
        let clock = MutableClock::shared();
        let auth = authenticator(&clock);
        let tokens = auth.login("a@x.com", "pw").unwrap().tokens;
        let claims = auth.authorize(Some(&tokens.access_token)).unwrap();

        clock.advance(Duration::minutes(31));
        assert!(matches!(
            auth.session_status(&claims, &tokens.access_token),
            Err(AuthError::SessionExpired)
        ));
        assert!(matches!(
            auth.session_status(&claims, &tokens.access_token),
            Err(AuthError::SessionRejected(_))
        ));
    }

    #[test]
    fn elevation_rules() {
        let clock = MutableClock::shared();
        let auth = authenticator(&clock);
        let user = auth.login("a@x.com", "pw").unwrap().tokens;
        let admin = auth.login("root@x.com", "rootpw").unwrap().tokens;
        let user_claims = auth.authorize(Some(&user.access_token)).unwrap();
        let admin_claims = auth.authorize(Some(&admin.access_token)).unwrap();

        assert!(matches!(
            auth.elevate(&user_claims, "root@x.com"),
            Err(AuthError::Forbidden(_))
        ));
        assert!(matches!(
            auth.elevate(&user_claims, "ghost@x.com"),
            Err(AuthError::Forbidden(_))
        ));
        assert!(matches!(
            auth.elevate(&admin_claims, "root@x.com"),
            Err(AuthError::AlreadyAdmin)
        ));
        assert!(matches!(
            auth.elevate(&admin_claims, "ghost@x.com"),
            Err(AuthError::NotFound(_))
        ));

        assert!(auth.elevate(&admin_claims, "a@x.com").unwrap().is_admin);
        assert!(matches!(
            auth.elevate(&admin_claims, "a@x.com"),
            Err(AuthError::AlreadyAdmin)
        ));

        // The next refresh carries the new privilege.
        let next = auth.refresh(&user.refresh_token).unwrap();
        assert!(auth.authorize(Some(&next.access_token)).unwrap().is_admin);
    }

    #[test]
    fn register_validates_input() {
        let clock = MutableClock::shared();
        let auth = Authenticator::new(&test_settings(), AuthStores::in_memory(), shared(&clock));

        let err = |email: &str, pw: &str, dept: &str| auth.register(email, pw, dept).unwrap_err();
        assert!(matches!(
            err("", "password1", "Tax"),
            AuthError::ValidationError(_)
        ));
        assert!(matches!(
            err("not-an-email", "password1", "Tax"),
            AuthError::ValidationError(_)
        ));
        assert!(matches!(
            err("c@gmail.com", "password1", "Tax"),
            AuthError::ValidationError(_)
        ));
        assert!(matches!(
            err("c@bdo.co.zw", "short", "Tax"),
            AuthError::ValidationError(_)
        ));
        assert!(matches!(
            err("c@bdo.co.zw", "password1", "Marketing"),
            AuthError::ValidationError(_)
        ));

        let record = auth.register("c@BDO.co.zw", "password1", "audit").unwrap();
        assert_eq!(record.department, Department::Audit);
        assert!(!record.is_admin);
        assert!(matches!(
            auth.register("c@BDO.co.zw", "password1", "Tax"),
            Err(AuthError::Conflict(_))
        ));
        assert!(auth.login("c@BDO.co.zw", "password1").is_ok());
    }

    #[test]
    fn register_without_domain_rule_accepts_any_domain() {
        let clock = MutableClock::shared();
        let mut settings = test_settings();
        settings.allowed_email_domain = Some("  ".into());
        let auth = Authenticator::new(&settings, AuthStores::in_memory(), shared(&clock));
        assert!(auth.register("c@gmail.com", "password1", "IT").is_ok());
    }

    #[test]
    fn reset_password_replaces_hash_and_counts() {
        let clock = MutableClock::shared();
        let auth = authenticator(&clock);
        let tokens = auth.login("a@x.com", "pw").unwrap().tokens;
        let claims = auth.authorize(Some(&tokens.access_token)).unwrap();

        auth.reset_password(&claims, "a@x.com", "brand-new-pw").unwrap();
        assert!(matches!(
            auth.login("a@x.com", "pw"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(auth.login("a@x.com", "brand-new-pw").is_ok());

        let check = auth.password_reset_eligibility("a@x.com").unwrap();
        assert_eq!(check.monthly_count, 1);
        assert_eq!(check.remaining_resets, 2);
    }

    #[test]
    fn reset_password_enforces_ownership_and_quota() {
        let clock = MutableClock::shared();
        let auth = authenticator(&clock);
        let user = auth.login("a@x.com", "pw").unwrap().tokens;
        let admin = auth.login("root@x.com", "rootpw").unwrap().tokens;
        let user_claims = auth.authorize(Some(&user.access_token)).unwrap();
        let admin_claims = auth.authorize(Some(&admin.access_token)).unwrap();

        assert!(matches!(
            auth.reset_password(&user_claims, "root@x.com", "password1"),
            Err(AuthError::Forbidden(_))
        ));
        assert!(matches!(
            auth.reset_password(&admin_claims, "ghost@x.com", "password1"),
            Err(AuthError::NotFound(_))
        ));
        assert!(matches!(
            auth.reset_password(&user_claims, "a@x.com", "short"),
            Err(AuthError::ValidationError(_))
        ));

        for _ in 0..3 {
            auth.reset_password(&admin_claims, "a@x.com", "password1")
                .unwrap();
        }
        assert!(matches!(
            auth.reset_password(&user_claims, "a@x.com", "password2"),
            Err(AuthError::ResetLimitExceeded)
        ));
    }

    #[test]
    fn sweep_removes_idle_sessions() {
        let clock = MutableClock::shared();
        let auth = authenticator(&clock);
        auth.login("a@x.com", "pw").unwrap();
        auth.login("root@x.com", "rootpw").unwrap();
        clock.advance(Duration::minutes(31));
        assert_eq!(auth.sweep_sessions().unwrap(), 2);
    }
}
