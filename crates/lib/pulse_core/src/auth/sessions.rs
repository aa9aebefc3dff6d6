// @zen-component: AUTH-SessionRegistry
//
//! Server-side session tracking with inactivity expiry.
//!
//! One record per login. A session is alive while its idle time stays within
//! the inactivity timeout; a failed liveness check evicts it on the spot.
//! Read-modify-write operations hold `write_lock` so a late `touch` can never
//! write back token digests that `rotate` has already replaced.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use tracing::debug;
use uuid::Uuid;

use super::jwt::token_digest;
use crate::clock::SharedClock;
use crate::models::auth::{SessionRecord, TokenPair};
use crate::store::{Store, StoreError};

/// Table of active sessions.
pub struct SessionRegistry {
    store: Arc<dyn Store<SessionRecord>>,
    clock: SharedClock,
    inactivity_timeout: Duration,
    write_lock: Mutex<()>,
}

impl SessionRegistry {
    pub fn new(
        store: Arc<dyn Store<SessionRecord>>,
        clock: SharedClock,
        inactivity_timeout: Duration,
    ) -> Self {
        Self {
            store,
            clock,
            inactivity_timeout,
            write_lock: Mutex::new(()),
        }
    }

    pub fn inactivity_timeout(&self) -> Duration {
        self.inactivity_timeout
    }

    /// Record a new session for `email`; returns its id.
    pub fn register(&self, email: &str, pair: &TokenPair) -> Result<String, StoreError> {
        let now = self.clock.utc();
        let record = SessionRecord {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            access_digest: token_digest(&pair.access_token),
            refresh_digest: token_digest(&pair.refresh_token),
            created_at: now,
            last_activity: now,
        };
        let id = record.id.clone();
        self.store.put(record)?;
        debug!(session_id = %id, email, "session registered");
        Ok(id)
    }

    /// Mark the session active now. Returns `false` if it does not exist.
    pub fn touch(&self, session_id: &str) -> Result<bool, StoreError> {
        let _guard = self.lock();
        let Some(mut record) = self.store.get(&session_id.to_string())? else {
            return Ok(false);
        };
        record.last_activity = self.clock.utc();
        self.store.put(record)?;
        Ok(true)
    }

    /// Whether the session exists and has not idled out. Evicts it if not.
    pub fn is_alive(&self, session_id: &str) -> Result<bool, StoreError> {
        let _guard = self.lock();
        let key = session_id.to_string();
        let Some(record) = self.store.get(&key)? else {
            return Ok(false);
        };
        if self.idle_expired(&record) {
            self.store.delete(&key)?;
            debug!(session_id, email = %record.email, "idle session evicted");
            return Ok(false);
        }
        Ok(true)
    }

    /// Remove one session. Absent sessions are ignored.
    pub fn revoke(&self, session_id: &str) -> Result<(), StoreError> {
        self.store.delete(&session_id.to_string())?;
        Ok(())
    }

    /// Remove every session owned by `email`; returns how many were removed.
    pub fn revoke_all(&self, email: &str) -> Result<usize, StoreError> {
        let _guard = self.lock();
        let sessions = self.store.scan_by_owner(email)?;
        for session in &sessions {
            self.store.delete(&session.id)?;
        }
        Ok(sessions.len())
    }

    /// Session currently bound to `refresh_token`.
    pub fn find_by_refresh_token(
        &self,
        email: &str,
        refresh_token: &str,
    ) -> Result<Option<SessionRecord>, StoreError> {
        let digest = token_digest(refresh_token);
        Ok(self
            .store
            .scan_by_owner(email)?
            .into_iter()
            .find(|s| s.refresh_digest == digest))
    }

    /// Session currently bound to `access_token`.
    pub fn find_by_access_token(
        &self,
        email: &str,
        access_token: &str,
    ) -> Result<Option<SessionRecord>, StoreError> {
        let digest = token_digest(access_token);
        Ok(self
            .store
            .scan_by_owner(email)?
            .into_iter()
            .find(|s| s.access_digest == digest))
    }

    /// Swap in `pair` if `presented_refresh` is still the session's current
    /// refresh token. Returns `false` when another rotation got there first
    /// or the session is gone.
    pub fn rotate(
        &self,
        session_id: &str,
        presented_refresh: &str,
        pair: &TokenPair,
    ) -> Result<bool, StoreError> {
        let _guard = self.lock();
        let Some(mut record) = self.store.get(&session_id.to_string())? else {
            return Ok(false);
        };
        if record.refresh_digest != token_digest(presented_refresh) {
            return Ok(false);
        }
        record.access_digest = token_digest(&pair.access_token);
        record.refresh_digest = token_digest(&pair.refresh_token);
        self.store.put(record)?;
        Ok(true)
    }

    /// Time left before `record` idles out (zero if it already has).
    pub fn idle_remaining(&self, record: &SessionRecord) -> Duration {
        let remaining = self.inactivity_timeout - self.idle_for(record);
        remaining.max(Duration::zero())
    }

    /// Evict every idle session; returns how many were removed.
    pub fn sweep(&self) -> Result<usize, StoreError> {
        let _guard = self.lock();
        let mut evicted = 0;
        for record in self.store.scan()? {
            if self.idle_expired(&record) {
                self.store.delete(&record.id)?;
                evicted += 1;
            }
        }
        if evicted > 0 {
            debug!(evicted, "session sweep");
        }
        Ok(evicted)
    }

    /// Live session count for `email`.
    pub fn count_for(&self, email: &str) -> Result<usize, StoreError> {
        Ok(self
            .store
            .scan_by_owner(email)?
            .iter()
            .filter(|s| !self.idle_expired(s))
            .count())
    }

    fn idle_for(&self, record: &SessionRecord) -> Duration {
        let now: DateTime<Utc> = self.clock.utc();
        now - record.last_activity
    }

    fn idle_expired(&self, record: &SessionRecord) -> bool {
        self.idle_for(record) > self.inactivity_timeout
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
