// @zen-component: RETAKE-Gate
//
//! Score-gated retake cooldowns.
//!
//! Every transition of a (user, quiz) record happens here, after the stored
//! state has been reconciled against the clock. Read-modify-write sequences
//! for one key are serialized through a per-key mutex.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use thiserror::Error;
use tracing::{debug, info};

use crate::clock::SharedClock;
use crate::config::RetakePolicy;
use crate::models::retake::{RetakeKey, RetakeRecord, RetakeState, RetakeStatus};
use crate::store::{MemoryStore, Store, StoreError};

#[derive(Debug, Error)]
pub enum RetakeError {
    #[error("{0}")]
    NotEligible(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Score must be between 0 and 100, got {0}")]
    InvalidScore(f64),

    #[error("Cooldown end is out of range")]
    CooldownOverflow,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Outcome of starting a retake.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetakeStart {
    pub cooldown_until: DateTime<Utc>,
    pub attempts_remaining: u32,
}

pub struct RetakeGate {
    store: Arc<dyn Store<RetakeRecord>>,
    clock: SharedClock,
    policy: RetakePolicy,
    /// One mutex per key ever touched. Records are never deleted, so this
    /// grows with the record table and no faster.
    locks: DashMap<RetakeKey, Arc<Mutex<()>>>,
}

impl RetakeGate {
    pub fn new(
        store: Arc<dyn Store<RetakeRecord>>,
        clock: SharedClock,
        policy: RetakePolicy,
    ) -> Self {
        Self {
            store,
            clock,
            policy,
            locks: DashMap::new(),
        }
    }

    pub fn in_memory(clock: SharedClock, policy: RetakePolicy) -> Self {
        Self::new(Arc::new(MemoryStore::new()), clock, policy)
    }

    pub fn policy(&self) -> &RetakePolicy {
        &self.policy
    }

    /// Arm a cooldown if `score` fails the threshold.
    ///
    /// Returns the resulting status when the score qualified, `None` when it
    /// passed and nothing changed.
    pub fn record_submission(
        &self,
        user: &str,
        quiz: &str,
        score: f64,
    ) -> Result<Option<RetakeStatus>, RetakeError> {
        check_score(score)?;
        if !self.qualifies(score) {
            return Ok(None);
        }

        let key = RetakeKey::new(user, quiz);
        self.with_key(&key, |current, now| {
            let next = match current {
                None => RetakeState::Cooling {
                    until: self.cooldown_end(now)?,
                    attempts_used: 0,
                },
                Some(RetakeState::Idle { attempts_used })
                | Some(RetakeState::Available { attempts_used }) => {
                    if attempts_used >= self.policy.max_attempts {
                        RetakeState::Consumed { attempts_used }
                    } else {
                        RetakeState::Cooling {
                            until: self.cooldown_end(now)?,
                            attempts_used,
                        }
                    }
                }
                // Never re-arm a running cooldown or reopen a spent pair.
                Some(state) => state,
            };
            if current != Some(next) {
                info!(user = %key.user, quiz = %key.quiz, score, "retake cooldown armed");
            }
            Ok((next, Some(RetakeStatus::from(next))))
        })
    }

    /// Current eligibility, creating the record on first query.
    pub fn status(&self, user: &str, quiz: &str) -> Result<RetakeStatus, RetakeError> {
        let key = RetakeKey::new(user, quiz);
        self.with_key(&key, |current, _| {
            let state = current.unwrap_or(RetakeState::Idle { attempts_used: 0 });
            Ok((state, RetakeStatus::from(state)))
        })
    }

    /// Begin a retake. Consumes an attempt and restarts the cooldown.
    pub fn start(&self, user: &str, quiz: &str, score: f64) -> Result<RetakeStart, RetakeError> {
        check_score(score)?;
        if !self.qualifies(score) {
            return Err(RetakeError::NotEligible(format!(
                "Retakes only allowed for scores below {}",
                self.policy.score_threshold
            )));
        }

        let key = RetakeKey::new(user, quiz);
        self.with_key(&key, |current, now| {
            let attempts_used = current.map_or(0, |s| s.attempts_used());
            let consumed = matches!(current, Some(RetakeState::Consumed { .. }));
            if consumed || attempts_used >= self.policy.max_attempts {
                return Err(RetakeError::NotEligible(
                    "Maximum retake attempts reached".into(),
                ));
            }

            let attempts_used = attempts_used + 1;
            let until = self.cooldown_end(now)?;
            info!(user = %key.user, quiz = %key.quiz, attempts_used, "retake started");
            Ok((
                RetakeState::Cooling {
                    until,
                    attempts_used,
                },
                RetakeStart {
                    cooldown_until: until,
                    attempts_remaining: self.policy.max_attempts - attempts_used,
                },
            ))
        })
    }

    /// Mark the retake finished, clearing cooldown and eligibility.
    pub fn complete(&self, user: &str, quiz: &str) -> Result<RetakeStatus, RetakeError> {
        let key = RetakeKey::new(user, quiz);
        self.with_key(&key, |current, _| {
            let Some(state) = current else {
                return Err(RetakeError::NotFound("No retake data found".into()));
            };
            let attempts_used = state.attempts_used();
            let next = if attempts_used < self.policy.max_attempts {
                RetakeState::Idle { attempts_used }
            } else {
                RetakeState::Consumed { attempts_used }
            };
            debug!(user = %key.user, quiz = %key.quiz, "retake completed");
            Ok((next, RetakeStatus::from(next)))
        })
    }

    fn cooldown_end(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, RetakeError> {
        now.checked_add_signed(self.policy.cooldown)
            .ok_or(RetakeError::CooldownOverflow)
    }

    fn qualifies(&self, score: f64) -> bool {
        score < self.policy.score_threshold
    }

    /// Run `transition` on the reconciled state of `key` while holding the
    /// key's lock, persisting whatever state it returns.
    fn with_key<T, F>(&self, key: &RetakeKey, transition: F) -> Result<T, RetakeError>
    where
        F: FnOnce(Option<RetakeState>, DateTime<Utc>) -> Result<(RetakeState, T), RetakeError>,
    {
        let lock = self.locks.entry(key.clone()).or_default().clone();
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let now = self.clock.utc();
        let current = self
            .store
            .get(key)?
            .map(|record| record.state.reconciled(now, self.policy.max_attempts));
        let (state, out) = transition(current, now)?;
        self.store.put(RetakeRecord {
            key: key.clone(),
            state,
        })?;
        Ok(out)
    }
}

fn check_score(score: f64) -> Result<(), RetakeError> {
    if score.is_finite() && (0.0..=100.0).contains(&score) {
        Ok(())
    } else {
        Err(RetakeError::InvalidScore(score))
    }
}
