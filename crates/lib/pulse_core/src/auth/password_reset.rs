//! Per-user password reset quota, counted per calendar month (UTC).

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::clock::SharedClock;
use crate::models::auth::PasswordResetRecord;
use crate::store::{Store, StoreError};

/// Whether a user may reset their password right now.
#[derive(Debug, Clone, PartialEq)]
pub struct ResetEligibility {
    pub can_reset: bool,
    pub remaining_resets: u32,
    pub monthly_count: u32,
    /// When the monthly counter next returns to zero.
    pub next_reset_date: DateTime<Utc>,
}

pub struct PasswordResetLedger {
    store: Arc<dyn Store<PasswordResetRecord>>,
    clock: SharedClock,
    monthly_limit: u32,
    lock: Mutex<()>,
}

impl PasswordResetLedger {
    pub fn new(
        store: Arc<dyn Store<PasswordResetRecord>>,
        clock: SharedClock,
        monthly_limit: u32,
    ) -> Self {
        Self {
            store,
            clock,
            monthly_limit,
            lock: Mutex::new(()),
        }
    }

    /// Current eligibility for `email`.
    pub fn check(&self, email: &str) -> Result<ResetEligibility, StoreError> {
        let now = self.clock.utc();
        let record = self.current(email, now)?;
        Ok(self.eligibility(&record, now))
    }

    /// Count one reset against the quota. Returns `false`, leaving the
    /// ledger untouched, when the month's quota is already spent.
    pub fn try_consume(&self, email: &str) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let now = self.clock.utc();
        let mut record = self.current(email, now)?;
        if record.monthly_count >= self.monthly_limit {
            return Ok(false);
        }
        record.monthly_count += 1;
        record.reset_count += 1;
        record.last_reset = Some(now);
        self.store.put(record)?;
        Ok(true)
    }

    /// Stored record for `email`, rolled over to the month containing `now`.
    fn current(&self, email: &str, now: DateTime<Utc>) -> Result<PasswordResetRecord, StoreError> {
        let record = match self.store.get(&email.to_string())? {
            Some(mut record) => {
                if !same_month(record.window_start, now) {
                    record.monthly_count = 0;
                    record.window_start = month_start(now.year(), now.month()).unwrap_or(now);
                }
                record
            }
            None => PasswordResetRecord {
                email: email.to_string(),
                reset_count: 0,
                monthly_count: 0,
                window_start: month_start(now.year(), now.month()).unwrap_or(now),
                last_reset: None,
            },
        };
        Ok(record)
    }

    fn eligibility(&self, record: &PasswordResetRecord, now: DateTime<Utc>) -> ResetEligibility {
        let (year, month) = if now.month() == 12 {
            (now.year() + 1, 1)
        } else {
            (now.year(), now.month() + 1)
        };
        ResetEligibility {
            can_reset: record.monthly_count < self.monthly_limit,
            remaining_resets: self.monthly_limit.saturating_sub(record.monthly_count),
            monthly_count: record.monthly_count,
            next_reset_date: month_start(year, month).unwrap_or(now),
        }
    }
}

fn same_month(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

fn month_start(year: i32, month: u32) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
