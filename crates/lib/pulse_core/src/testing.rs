//! Shared test doubles and fixtures.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;

use crate::auth::password::hash_password;
use crate::clock::SharedClock;
use crate::config::{AuthSettings, TokenSecrets};
use crate::models::auth::{CredentialRecord, Department};

/// Lowest cost bcrypt accepts; keeps fixture hashing fast.
pub const TEST_BCRYPT_COST: u32 = 4;

/// Clock that only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// A clock starting at [`fixture_time`], ready to share.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new(fixture_time()))
    }

    pub fn advance(&self, delta: Duration) {
        *self.lock_clock() += delta;
    }

    pub fn advance_seconds(&self, seconds: i64) {
        self.advance(Duration::seconds(seconds));
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.lock_clock() = now;
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Upcast a mutable clock into the handle services take.
pub fn shared(clock: &Arc<MutableClock>) -> SharedClock {
    clock.clone()
}

/// Fixed starting instant for time-based tests.
pub fn fixture_time() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).single() {
        Some(t) => t,
        None => panic!("valid fixture timestamp"),
    }
}

/// Settings with distinct test secrets and a cheap bcrypt cost.
pub fn test_settings() -> AuthSettings {
    let mut settings = AuthSettings::new(TokenSecrets::new(
        "test-access-secret",
        "test-refresh-secret",
    ));
    settings.bcrypt_cost = TEST_BCRYPT_COST;
    settings
}

/// Credential with a freshly hashed password.
pub fn credential(
    email: &str,
    password: &str,
    department: Department,
    is_admin: bool,
) -> CredentialRecord {
    let password_hash = match hash_password(password, TEST_BCRYPT_COST) {
        Ok(hash) => hash,
        Err(e) => panic!("fixture hash: {e}"),
    };
    CredentialRecord {
        email: email.to_string(),
        password_hash,
        department,
        is_admin,
    }
}
