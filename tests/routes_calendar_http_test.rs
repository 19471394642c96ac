// ABOUTME: HTTP integration tests for the calendar month view and client progress ratios
// ABOUTME: Uses fixed past dates so week and month windows are deterministic
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use common::{
    create_admin, create_approved_trainer, create_client_of, create_test_app, create_user,
    test_photo, TestApp,
};
use fitcoach_core::models::User;
use fitcoach_core::permissions::UserRole;
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};

fn day(date: &str) -> Value {
    json!({
        "date": date,
        "title": "Conditioning",
        "exercises": [{"name": "Rowing", "sets": 1, "reps": 1, "rest_seconds": 60}]
    })
}

/// Plan over Mon 10, Tue 11, Wed 12 and Mon 31 March 2025; Monday done, Tuesday missed
async fn march_fixture(app: &TestApp) -> (User, String, User, String) {
    let (trainer, trainer_token) = create_approved_trainer(app, "coach@example.com").await;
    let (client, client_token) = create_client_of(app, &trainer, "client@example.com").await;

    let plan: Value = AxumTestRequest::post("/api/plans")
        .bearer(&trainer_token)
        .json(&json!({
            "client_id": client.id,
            "title": "March block",
            "days": [day("2025-03-10"), day("2025-03-11"), day("2025-03-12"), day("2025-03-31")]
        }))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    let plan_id = plan["id"].as_str().unwrap();

    AxumTestRequest::post(&format!("/api/plans/{plan_id}/days/2025-03-10/complete"))
        .bearer(&client_token)
        .json(&json!({"photo": test_photo()}))
        .send(app.router())
        .await
        .assert_status(StatusCode::OK);
    AxumTestRequest::post(&format!("/api/plans/{plan_id}/days/2025-03-11/fail"))
        .bearer(&client_token)
        .json(&json!({"reason": "Sick"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::OK);

    (trainer, trainer_token, client, client_token)
}

#[tokio::test]
async fn test_calendar_month_groups_days_by_date() {
    let app = create_test_app().await;
    let (_, _, client, client_token) = march_fixture(&app).await;

    let calendar: Value = AxumTestRequest::get("/api/calendar?month=2025-03")
        .bearer(&client_token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(calendar["month"], "2025-03");
    assert_eq!(calendar["client_id"], client.id.to_string());

    let days = calendar["days"].as_array().unwrap();
    let summary: Vec<(&str, &str)> = days
        .iter()
        .map(|d| (d["date"].as_str().unwrap(), d["status"].as_str().unwrap()))
        .collect();
    assert_eq!(
        summary,
        [
            ("2025-03-10", "completed"),
            ("2025-03-11", "failed"),
            ("2025-03-12", "pending"),
            ("2025-03-31", "pending"),
        ]
    );

    let april: Value = AxumTestRequest::get("/api/calendar?month=2025-04")
        .bearer(&client_token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert!(april["days"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_calendar_rejects_malformed_month() {
    let app = create_test_app().await;
    let (_, token) = create_user(&app, UserRole::Client, "client@example.com", "Client").await;

    let response = AxumTestRequest::get("/api/calendar?month=2025-13")
        .bearer(&token)
        .send(app.router())
        .await;
    assert_eq!(response.status(), 400);
    assert_eq!(response.error_code(), "INVALID_FORMAT");
}

#[tokio::test]
async fn test_progress_week_and_month_ratios() {
    let app = create_test_app().await;
    let (_, _, _, client_token) = march_fixture(&app).await;

    let progress: Value = AxumTestRequest::get("/api/progress?date=2025-03-12")
        .bearer(&client_token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(progress["reference_date"], "2025-03-12");

    assert_eq!(progress["week"]["start"], "2025-03-10");
    assert_eq!(progress["week"]["end"], "2025-03-16");
    assert_eq!(progress["week"]["scheduled"], 3);
    assert_eq!(progress["week"]["completed"], 1);
    assert_eq!(progress["week"]["failed"], 1);
    assert_eq!(progress["week"]["ratio"], 0.33);

    assert_eq!(progress["month"]["scheduled"], 4);
    assert_eq!(progress["month"]["pending"], 2);
    assert_eq!(progress["month"]["ratio"], 0.25);
}

#[tokio::test]
async fn test_trainer_views_own_client_only() {
    let app = create_test_app().await;
    let (_, trainer_token, client, _) = march_fixture(&app).await;
    let (_, other_token) = create_approved_trainer(&app, "other@example.com").await;

    let missing_scope = AxumTestRequest::get("/api/progress?date=2025-03-12")
        .bearer(&trainer_token)
        .send(app.router())
        .await;
    assert_eq!(missing_scope.status(), 400);
    assert_eq!(missing_scope.error_code(), "MISSING_REQUIRED_FIELD");

    let progress: Value = AxumTestRequest::get(&format!(
        "/api/progress?date=2025-03-12&client_id={}",
        client.id
    ))
    .bearer(&trainer_token)
    .send(app.router())
    .await
    .assert_status(StatusCode::OK)
    .json();
    assert_eq!(progress["client_id"], client.id.to_string());
    assert_eq!(progress["week"]["completed"], 1);

    let foreign = AxumTestRequest::get(&format!(
        "/api/calendar?month=2025-03&client_id={}",
        client.id
    ))
    .bearer(&other_token)
    .send(app.router())
    .await;
    assert_eq!(foreign.status(), 403);
}

#[tokio::test]
async fn test_client_cannot_view_another_client() {
    let app = create_test_app().await;
    let (_, _, client, _) = march_fixture(&app).await;
    let (_, other_token) = create_user(&app, UserRole::Client, "other@example.com", "Other").await;
    let (_, admin_token) = create_admin(&app).await;

    let response = AxumTestRequest::get(&format!(
        "/api/calendar?month=2025-03&client_id={}",
        client.id
    ))
    .bearer(&other_token)
    .send(app.router())
    .await;
    assert_eq!(response.status(), 403);

    AxumTestRequest::get(&format!(
        "/api/calendar?month=2025-03&client_id={}",
        client.id
    ))
    .bearer(&admin_token)
    .send(app.router())
    .await
    .assert_status(StatusCode::OK);
}
