//! # pulse_api
//!
//! HTTP API library for Skills Pulse.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod sweeper;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use pulse_core::auth::authenticator::{AuthStores, Authenticator};
use pulse_core::clock::SharedClock;
use pulse_core::retake::RetakeGate;

use crate::config::ApiConfig;
use crate::handlers::{auth, health, password_reset, responses, retakes, users};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub auth: Arc<Authenticator>,
    pub retakes: Arc<RetakeGate>,
    pub clock: SharedClock,
}

impl AppState {
    /// State over in-memory stores.
    pub fn new(config: ApiConfig, clock: SharedClock) -> Self {
        let auth = Authenticator::new(&config.auth, AuthStores::in_memory(), clock.clone());
        let retakes = RetakeGate::in_memory(clock.clone(), config.retake.clone());
        Self {
            config,
            auth: Arc::new(auth),
            retakes: Arc::new(retakes),
            clock,
        }
    }
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public = Router::new()
        .route(routes::GET_API_HEALTH, get(health::health))
        .route(routes::POST_API_REGISTER, post(auth::register_handler))
        .route(routes::POST_API_LOGIN, post(auth::login_handler))
        .route(routes::POST_API_REFRESH, post(auth::refresh_handler))
        .route(
            routes::GET_API_PASSWORD_RESET_CHECK,
            get(password_reset::check_handler),
        );

    // Protected routes (require a valid access token)
    let protected = Router::new()
        .route(routes::POST_API_LOGOUT, post(auth::logout_handler))
        .route(routes::POST_API_LOGOUT_ALL, post(auth::logout_all_handler))
        .route(
            routes::GET_API_SESSION_STATUS,
            get(auth::session_status_handler),
        )
        .route(
            routes::POST_API_USERS_EMAIL_ELEVATE,
            post(users::elevate_handler),
        )
        .route(
            routes::POST_API_RESPONSES,
            post(responses::submit_response_handler),
        )
        .route(
            routes::GET_API_RETAKE_STATUS,
            get(retakes::retake_status_handler),
        )
        .route(
            routes::POST_API_RETAKE_START,
            post(retakes::start_retake_handler),
        )
        .route(
            routes::POST_API_RETAKE_COMPLETE,
            post(retakes::complete_retake_handler),
        )
        .route(
            routes::POST_API_PASSWORD_RESET,
            post(password_reset::reset_handler),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
