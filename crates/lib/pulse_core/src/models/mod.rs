//! Domain models.

pub mod auth;
pub mod retake;
