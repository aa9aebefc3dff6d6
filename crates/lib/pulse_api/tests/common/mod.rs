//! Shared harness for router integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use pulse_api::AppState;
use pulse_api::config::ApiConfig;
use pulse_core::config::AuthSettings;
use pulse_core::models::auth::Department;
use pulse_core::testing::{MutableClock, credential, shared, test_settings};
use serde_json::Value;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub clock: Arc<MutableClock>,
}

impl TestApp {
    /// Router over fresh in-memory stores, seeded with a regular user
    /// `a@x.com` / `pw`, a second user `b@x.com` / `pw` and an admin
    /// `root@x.com` / `rootpw`.
    pub fn new() -> Self {
        Self::with_settings(test_settings())
    }

    pub fn with_settings(settings: AuthSettings) -> Self {
        let clock = MutableClock::shared();
        let state = AppState::new(ApiConfig::new(settings), shared(&clock));
        for record in [
            credential("a@x.com", "pw", Department::Tax, false),
            credential("b@x.com", "pw", Department::Audit, false),
            credential("root@x.com", "rootpw", Department::It, true),
        ] {
            state.auth.upsert_credential(record).unwrap();
        }
        Self {
            router: pulse_api::router(state.clone()),
            state,
            clock,
        }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.expect("request");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("parse JSON")
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    /// Log in and return `(access_token, refresh_token)`.
    pub async fn login(&self, email: &str, password: &str) -> (String, String) {
        let (status, body) = self
            .post(
                "/api/login",
                None,
                serde_json::json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        (
            body["accessToken"].as_str().unwrap().to_string(),
            body["refreshToken"].as_str().unwrap().to_string(),
        )
    }
}
