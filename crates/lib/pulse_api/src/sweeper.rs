//! Background eviction of idle sessions.

use std::sync::Arc;
use std::time::Duration;

use pulse_core::auth::authenticator::Authenticator;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Sweep idle sessions every `period` until the task is aborted.
pub fn spawn_session_sweeper(auth: Arc<Authenticator>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            match auth.sweep_sessions() {
                Ok(0) => {}
                Ok(evicted) => debug!(evicted, "idle sessions swept"),
                Err(e) => warn!(error = %e, "session sweep failed"),
            }
        }
    })
}
