//! # pulse_core
//!
//! Core session, token and retake logic for Skills Pulse.

pub mod auth;
pub mod clock;
pub mod config;
pub mod models;
pub mod retake;
pub mod seed;
pub mod store;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
