//! Retake domain models.

use chrono::{DateTime, Utc};

use crate::store::Record;

/// Identifies one user's attempts at one quiz.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RetakeKey {
    pub user: String,
    pub quiz: String,
}

impl RetakeKey {
    pub fn new(user: impl Into<String>, quiz: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            quiz: quiz.into(),
        }
    }
}

/// Where a (user, quiz) pair stands in the retake lifecycle.
///
/// A missing record is the initial state; transitions live in
/// [`crate::retake::RetakeGate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RetakeState {
    /// No cooldown running and no retake on offer.
    Idle { attempts_used: u32 },
    /// Cool-off running until `until`.
    Cooling {
        until: DateTime<Utc>,
        attempts_used: u32,
    },
    /// Cool-off elapsed and an attempt remains.
    Available { attempts_used: u32 },
    /// Every permitted retake has been used. Terminal.
    Consumed { attempts_used: u32 },
}

impl RetakeState {
    pub fn attempts_used(&self) -> u32 {
        match *self {
            RetakeState::Idle { attempts_used }
            | RetakeState::Cooling { attempts_used, .. }
            | RetakeState::Available { attempts_used }
            | RetakeState::Consumed { attempts_used } => attempts_used,
        }
    }

    pub fn cooldown_until(&self) -> Option<DateTime<Utc>> {
        match *self {
            RetakeState::Cooling { until, .. } => Some(until),
            _ => None,
        }
    }

    pub fn can_retake(&self) -> bool {
        matches!(self, RetakeState::Available { .. })
    }

    /// Resolve a cooldown that has run out by `now`.
    pub fn reconciled(self, now: DateTime<Utc>, max_attempts: u32) -> Self {
        match self {
            RetakeState::Cooling {
                until,
                attempts_used,
            } if until <= now => {
                if attempts_used < max_attempts {
                    RetakeState::Available { attempts_used }
                } else {
                    RetakeState::Consumed { attempts_used }
                }
            }
            other => other,
        }
    }
}

/// Persisted retake record.
#[derive(Debug, Clone, PartialEq)]
pub struct RetakeRecord {
    pub key: RetakeKey,
    pub state: RetakeState,
}

impl Record for RetakeRecord {
    type Key = RetakeKey;

    fn key(&self) -> RetakeKey {
        self.key.clone()
    }

    fn owner(&self) -> &str {
        &self.key.user
    }
}

/// Externally visible view of a retake record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetakeStatus {
    pub attempts: u32,
    pub cooldown_until: Option<DateTime<Utc>>,
    pub can_retake: bool,
}

impl From<RetakeState> for RetakeStatus {
    fn from(state: RetakeState) -> Self {
        Self {
            attempts: state.attempts_used(),
            cooldown_until: state.cooldown_until(),
            can_retake: state.can_retake(),
        }
    }
}
