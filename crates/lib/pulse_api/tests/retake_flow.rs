//! Integration tests for response submission and the retake endpoints.

mod common;

use axum::http::StatusCode;
use chrono::{DateTime, Duration, Utc};
use pulse_core::testing::{fixture_time, test_settings};
use serde_json::json;

use common::TestApp;

fn cooldown_until(body: &serde_json::Value) -> DateTime<Utc> {
    serde_json::from_value(body["cooldownUntil"].clone()).expect("timestamp")
}

#[tokio::test]
async fn low_score_cooldown_then_single_retake() {
    // Access tokens outlive the cooldown so one login covers the scenario.
    let mut settings = test_settings();
    settings.access_ttl = Duration::hours(2);
    let app = TestApp::with_settings(settings);
    let (token, _) = app.login("b@x.com", "pw").await;
    let token = Some(token.as_str());

    let (status, body) = app
        .post(
            "/api/responses",
            token,
            json!({ "userEmail": "b@x.com", "quizId": "Q1", "score": 30 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["userEmail"], "b@x.com");
    assert_eq!(body["quizId"], "Q1");
    assert!(body["id"].as_str().unwrap().starts_with("response-"));
    assert_eq!(body["retake"]["canRetake"], false);

    let (status, body) = app.get("/api/users/b@x.com/quizzes/Q1/retake", token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["canRetake"], false);
    assert_eq!(body["attempts"], 0);
    assert_eq!(
        cooldown_until(&body) - fixture_time(),
        Duration::minutes(30)
    );

    app.clock.advance(Duration::minutes(29));
    let (_, body) = app.get("/api/users/b@x.com/quizzes/Q1/retake", token).await;
    assert_eq!(body["canRetake"], false);
    app.clock.advance(Duration::minutes(2));

    let (status, body) = app.get("/api/users/b@x.com/quizzes/Q1/retake", token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["canRetake"], true);
    assert!(body["cooldownUntil"].is_null());

    let (status, body) = app
        .post(
            "/api/users/b@x.com/quizzes/Q1/retake/start",
            token,
            json!({ "score": 30 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Retake cooldown started");
    assert_eq!(body["attemptsRemaining"], 0);

    let (status, body) = app
        .post(
            "/api/users/b@x.com/quizzes/Q1/retake/start",
            token,
            json!({ "score": 30 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "RETAKE_NOT_ELIGIBLE");
}

#[tokio::test]
async fn passing_score_does_not_arm() {
    let app = TestApp::new();
    let (token, _) = app.login("a@x.com", "pw").await;
    let token = Some(token.as_str());

    let (status, body) = app
        .post(
            "/api/responses",
            token,
            json!({ "userEmail": "a@x.com", "quizId": "Q1", "score": 45, "timeSpent": 300 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["retake"].is_null());
    assert_eq!(body["timeSpent"], 300);

    let (status, body) = app
        .post(
            "/api/users/a@x.com/quizzes/Q1/retake/start",
            token,
            json!({ "score": 45 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "RETAKE_NOT_ELIGIBLE");
}

#[tokio::test]
async fn out_of_range_score_is_rejected() {
    let app = TestApp::new();
    let (token, _) = app.login("a@x.com", "pw").await;

    let (status, body) = app
        .post(
            "/api/responses",
            Some(&token),
            json!({ "userEmail": "a@x.com", "quizId": "Q1", "score": 140 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = app
        .post(
            "/api/responses",
            Some(&token),
            json!({ "userEmail": "a@x.com", "quizId": "Q1" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn users_cannot_touch_each_others_retakes() {
    let app = TestApp::new();
    let (user, _) = app.login("a@x.com", "pw").await;
    let (admin, _) = app.login("root@x.com", "rootpw").await;

    let (status, body) = app
        .get("/api/users/b@x.com/quizzes/Q1/retake", Some(&user))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, _) = app
        .post(
            "/api/responses",
            Some(&user),
            json!({ "userEmail": "b@x.com", "quizId": "Q1", "score": 10 }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .get("/api/users/b@x.com/quizzes/Q1/retake", Some(&admin))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn retake_routes_require_a_token() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/users/a@x.com/quizzes/Q1/retake", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn complete_without_record_is_not_found() {
    let app = TestApp::new();
    let (token, _) = app.login("a@x.com", "pw").await;

    let (status, body) = app
        .post(
            "/api/users/a@x.com/quizzes/Q9/retake/complete",
            Some(&token),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn complete_clears_the_cooldown() {
    let app = TestApp::new();
    let (token, _) = app.login("a@x.com", "pw").await;
    let token = Some(token.as_str());

    app.post(
        "/api/responses",
        token,
        json!({ "userEmail": "a@x.com", "quizId": "Q1", "score": 12.5 }),
    )
    .await;
    let (status, body) = app
        .post(
            "/api/users/a@x.com/quizzes/Q1/retake/complete",
            token,
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Retake marked as completed");

    let (_, body) = app.get("/api/users/a@x.com/quizzes/Q1/retake", token).await;
    assert!(body["cooldownUntil"].is_null());
    assert_eq!(body["canRetake"], false);
}

#[tokio::test]
async fn start_for_unknown_user_is_not_found() {
    let app = TestApp::new();
    let (admin, _) = app.login("root@x.com", "rootpw").await;

    let (status, body) = app
        .post(
            "/api/users/ghost@x.com/quizzes/Q1/retake/start",
            Some(&admin),
            json!({ "score": 10 }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn spent_retake_is_not_rearmed_by_a_new_low_score() {
    let mut settings = test_settings();
    settings.access_ttl = Duration::hours(2);
    let app = TestApp::with_settings(settings);
    let (token, _) = app.login("a@x.com", "pw").await;
    let token = Some(token.as_str());

    let (status, _) = app
        .post(
            "/api/users/a@x.com/quizzes/Q1/retake/start",
            token,
            json!({ "score": 20 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    app.clock.advance(Duration::minutes(31));

    let (status, body) = app
        .post(
            "/api/responses",
            token,
            json!({ "userEmail": "a@x.com", "quizId": "Q1", "score": 10 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["retake"]["attempts"], 1);
    assert_eq!(body["retake"]["canRetake"], false);
    assert!(body["retake"]["cooldownUntil"].is_null());

    let (_, body) = app.get("/api/users/a@x.com/quizzes/Q1/retake", token).await;
    assert_eq!(body["attempts"], 1);
    assert_eq!(body["canRetake"], false);
    assert!(body["cooldownUntil"].is_null());
}
