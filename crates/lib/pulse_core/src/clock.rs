//! Injected wall clock.
//!
//! Every expiry in the crate (tokens, sessions, cooldowns, reset windows) is
//! measured against a [`SharedClock`] rather than the process clock, so tests
//! can move time forward deterministically.

use std::sync::Arc;

pub use mockable::{Clock, DefaultClock};

/// Clock handle shared between services.
pub type SharedClock = Arc<dyn Clock + Send + Sync>;

/// The real system clock.
pub fn system_clock() -> SharedClock {
    Arc::new(DefaultClock)
}
