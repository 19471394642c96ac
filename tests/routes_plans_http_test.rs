// ABOUTME: HTTP integration tests for templates, plans and the day completion state machine
// ABOUTME: Covers ownership rules, photo proof, future dates, repeated reports and trainer notifications
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use common::{
    create_approved_trainer, create_client_of, create_test_app, create_user, days_from_today,
    test_photo, TestApp,
};
use fitcoach_core::models::User;
use fitcoach_core::permissions::UserRole;
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};

fn squat_day(date: chrono::NaiveDate) -> Value {
    json!({
        "date": date,
        "title": "Legs",
        "exercises": [{"name": "Squat", "sets": 5, "reps": 5, "rest_seconds": 120}]
    })
}

/// Trainer, client and a plan with yesterday, today and a future day
async fn plan_fixture(app: &TestApp) -> (User, String, User, String, String) {
    let (trainer, trainer_token) = create_approved_trainer(app, "coach@example.com").await;
    let (client, client_token) = create_client_of(app, &trainer, "client@example.com").await;

    let plan: Value = AxumTestRequest::post("/api/plans")
        .bearer(&trainer_token)
        .json(&json!({
            "client_id": client.id,
            "title": "Strength block",
            "days": [
                squat_day(days_from_today(-1)),
                squat_day(days_from_today(0)),
                squat_day(days_from_today(2)),
            ]
        }))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    let plan_id = plan["id"].as_str().unwrap().to_owned();
    (trainer, trainer_token, client, client_token, plan_id)
}

// ============================================================================
// Templates
// ============================================================================

#[tokio::test]
async fn test_template_crud_for_approved_trainer() {
    let app = create_test_app().await;
    let (_, token) = create_approved_trainer(&app, "coach@example.com").await;

    let created: Value = AxumTestRequest::post("/api/templates")
        .bearer(&token)
        .json(&json!({
            "name": "Push day",
            "exercises": [{"name": "Bench press", "sets": 4, "reps": 8}]
        }))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    let id = created["id"].as_str().unwrap().to_owned();

    let listed: Vec<Value> = AxumTestRequest::get("/api/templates")
        .bearer(&token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(listed.len(), 1);

    let updated: Value = AxumTestRequest::put(&format!("/api/templates/{id}"))
        .bearer(&token)
        .json(&json!({
            "name": "Push day v2",
            "exercises": [{"name": "Overhead press", "sets": 3, "reps": 10}]
        }))
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(updated["name"], "Push day v2");

    AxumTestRequest::delete(&format!("/api/templates/{id}"))
        .bearer(&token)
        .send(app.router())
        .await
        .assert_status(StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_template_requires_approved_trainer_and_exercises() {
    let app = create_test_app().await;
    let (_, pending_token) =
        create_user(&app, UserRole::Trainer, "pending@example.com", "Pending").await;
    let (_, approved_token) = create_approved_trainer(&app, "coach@example.com").await;

    let pending = AxumTestRequest::post("/api/templates")
        .bearer(&pending_token)
        .json(&json!({"name": "X", "exercises": [{"name": "Row", "sets": 3, "reps": 10}]}))
        .send(app.router())
        .await;
    assert_eq!(pending.status(), 403);

    let empty = AxumTestRequest::post("/api/templates")
        .bearer(&approved_token)
        .json(&json!({"name": "Empty", "exercises": []}))
        .send(app.router())
        .await;
    assert_eq!(empty.status(), 400);
}

// ============================================================================
// Plans
// ============================================================================

#[tokio::test]
async fn test_plan_from_template_copies_exercises_and_notifies_client() {
    let app = create_test_app().await;
    let (trainer, token) = create_approved_trainer(&app, "coach@example.com").await;
    let (client, client_token) = create_client_of(&app, &trainer, "client@example.com").await;

    let template: Value = AxumTestRequest::post("/api/templates")
        .bearer(&token)
        .json(&json!({
            "name": "Pull day",
            "exercises": [{"name": "Deadlift", "sets": 3, "reps": 5}]
        }))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();

    let plan: Value = AxumTestRequest::post("/api/plans")
        .bearer(&token)
        .json(&json!({
            "client_id": client.id,
            "title": "Back focus",
            "days": [{"date": days_from_today(1), "template_id": template["id"]}]
        }))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(plan["days"][0]["title"], "Pull day");
    assert_eq!(plan["days"][0]["exercises"][0]["name"], "Deadlift");
    assert_eq!(plan["days"][0]["status"], "pending");

    let notifications: Vec<Value> = AxumTestRequest::get("/api/notifications")
        .bearer(&client_token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["kind"], "plan_assigned");
    assert_eq!(notifications[0]["related_id"], plan["id"]);
}

#[tokio::test]
async fn test_plan_rejects_duplicate_dates_and_foreign_clients() {
    let app = create_test_app().await;
    let (trainer, token) = create_approved_trainer(&app, "coach@example.com").await;
    let (client, _) = create_client_of(&app, &trainer, "client@example.com").await;
    let (stranger, _) = create_user(&app, UserRole::Client, "other@example.com", "Other").await;

    let duplicate = AxumTestRequest::post("/api/plans")
        .bearer(&token)
        .json(&json!({
            "client_id": client.id,
            "title": "Dup",
            "days": [squat_day(days_from_today(3)), squat_day(days_from_today(3))]
        }))
        .send(app.router())
        .await;
    assert_eq!(duplicate.status(), 409);

    let foreign = AxumTestRequest::post("/api/plans")
        .bearer(&token)
        .json(&json!({
            "client_id": stranger.id,
            "title": "Not mine",
            "days": [squat_day(days_from_today(3))]
        }))
        .send(app.router())
        .await;
    assert_eq!(foreign.status(), 403);
}

#[tokio::test]
async fn test_plan_visibility() {
    let app = create_test_app().await;
    let (_, _, _, client_token, plan_id) = plan_fixture(&app).await;
    let (_, other_trainer) = create_approved_trainer(&app, "other-coach@example.com").await;

    AxumTestRequest::get(&format!("/api/plans/{plan_id}"))
        .bearer(&client_token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK);

    let hidden = AxumTestRequest::get(&format!("/api/plans/{plan_id}"))
        .bearer(&other_trainer)
        .send(app.router())
        .await;
    assert_eq!(hidden.status(), 403);

    let plans: Vec<Value> = AxumTestRequest::get("/api/plans")
        .bearer(&other_trainer)
        .send(app.router())
        .await
        .json();
    assert!(plans.is_empty());
}

#[tokio::test]
async fn test_plan_update_appends_days() {
    let app = create_test_app().await;
    let (_, trainer_token, _, _, plan_id) = plan_fixture(&app).await;

    let updated: Value = AxumTestRequest::put(&format!("/api/plans/{plan_id}"))
        .bearer(&trainer_token)
        .json(&json!({"title": "Strength block II", "days": [squat_day(days_from_today(5))]}))
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(updated["title"], "Strength block II");
    assert_eq!(updated["days"].as_array().unwrap().len(), 4);

    let collision = AxumTestRequest::put(&format!("/api/plans/{plan_id}"))
        .bearer(&trainer_token)
        .json(&json!({"days": [squat_day(days_from_today(0))]}))
        .send(app.router())
        .await;
    assert_eq!(collision.status(), 409);
}

// ============================================================================
// Day transitions
// ============================================================================

#[tokio::test]
async fn test_complete_day_with_photo_logs_and_notifies_trainer() {
    let app = create_test_app().await;
    let (_, trainer_token, _, client_token, plan_id) = plan_fixture(&app).await;
    let today = days_from_today(0);

    let recorded: Value =
        AxumTestRequest::post(&format!("/api/plans/{plan_id}/days/{today}/complete"))
            .bearer(&client_token)
            .json(&json!({"photo": test_photo(), "note": "Felt strong"}))
            .send(app.router())
            .await
            .assert_status(StatusCode::OK)
            .json();
    assert_eq!(recorded["day"]["status"], "completed");
    assert_eq!(recorded["log"]["status"], "completed");
    assert_eq!(recorded["log"]["note"], "Felt strong");
    assert_eq!(recorded["day"]["log_id"], recorded["log"]["id"]);

    let notifications: Vec<Value> = AxumTestRequest::get("/api/notifications?unread_only=true")
        .bearer(&trainer_token)
        .send(app.router())
        .await
        .json();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["kind"], "workout_completed");

    let logs: Vec<Value> = AxumTestRequest::get("/api/logs")
        .bearer(&trainer_token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(logs.len(), 1);
}

#[tokio::test]
async fn test_day_status_is_one_way() {
    let app = create_test_app().await;
    let (_, _, _, client_token, plan_id) = plan_fixture(&app).await;
    let yesterday = days_from_today(-1);

    AxumTestRequest::post(&format!("/api/plans/{plan_id}/days/{yesterday}/fail"))
        .bearer(&client_token)
        .json(&json!({"reason": "Sick"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::OK);

    let again = AxumTestRequest::post(&format!("/api/plans/{plan_id}/days/{yesterday}/complete"))
        .bearer(&client_token)
        .json(&json!({"photo": test_photo()}))
        .send(app.router())
        .await;
    assert_eq!(again.status(), 409);
    assert_eq!(again.error_code(), "INVALID_STATE_TRANSITION");
}

#[tokio::test]
async fn test_fail_day_without_body() {
    let app = create_test_app().await;
    let (_, _, _, client_token, plan_id) = plan_fixture(&app).await;
    let today = days_from_today(0);

    let recorded: Value = AxumTestRequest::post(&format!("/api/plans/{plan_id}/days/{today}/fail"))
        .bearer(&client_token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(recorded["day"]["status"], "failed");
}

#[tokio::test]
async fn test_complete_day_validation() {
    let app = create_test_app().await;
    let (_, trainer_token, _, client_token, plan_id) = plan_fixture(&app).await;
    let today = days_from_today(0);
    let future = days_from_today(2);

    let no_photo = AxumTestRequest::post(&format!("/api/plans/{plan_id}/days/{today}/complete"))
        .bearer(&client_token)
        .json(&json!({"note": "forgot the photo"}))
        .send(app.router())
        .await;
    assert_eq!(no_photo.status(), 400);
    assert_eq!(no_photo.error_code(), "MISSING_REQUIRED_FIELD");

    let not_base64 = AxumTestRequest::post(&format!("/api/plans/{plan_id}/days/{today}/complete"))
        .bearer(&client_token)
        .json(&json!({"photo": "%%%not-base64%%%"}))
        .send(app.router())
        .await;
    assert_eq!(not_base64.status(), 400);

    let oversized = format!(
        "data:image/jpeg;base64,{}",
        base64::Engine::encode(&base64::engine::general_purpose::STANDARD, vec![7u8; 4096])
    );
    let too_large = AxumTestRequest::post(&format!("/api/plans/{plan_id}/days/{today}/complete"))
        .bearer(&client_token)
        .json(&json!({"photo": oversized}))
        .send(app.router())
        .await;
    assert_eq!(too_large.status(), 413);

    let early = AxumTestRequest::post(&format!("/api/plans/{plan_id}/days/{future}/complete"))
        .bearer(&client_token)
        .json(&json!({"photo": test_photo()}))
        .send(app.router())
        .await;
    assert_eq!(early.status(), 400);
    assert_eq!(early.error_code(), "VALUE_OUT_OF_RANGE");

    let unscheduled = days_from_today(-10);
    let missing = AxumTestRequest::post(&format!("/api/plans/{plan_id}/days/{unscheduled}/complete"))
        .bearer(&client_token)
        .json(&json!({"photo": test_photo()}))
        .send(app.router())
        .await;
    assert_eq!(missing.status(), 404);

    let trainer = AxumTestRequest::post(&format!("/api/plans/{plan_id}/days/{today}/complete"))
        .bearer(&trainer_token)
        .json(&json!({"photo": test_photo()}))
        .send(app.router())
        .await;
    assert_eq!(trainer.status(), 403);
}

#[tokio::test]
async fn test_other_client_cannot_report_days() {
    let app = create_test_app().await;
    let (trainer, _, _, _, plan_id) = plan_fixture(&app).await;
    let (_, intruder_token) = create_client_of(&app, &trainer, "intruder@example.com").await;
    let today = days_from_today(0);

    let response = AxumTestRequest::post(&format!("/api/plans/{plan_id}/days/{today}/complete"))
        .bearer(&intruder_token)
        .json(&json!({"photo": test_photo()}))
        .send(app.router())
        .await;
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn test_plan_progress_counts_reported_days() {
    let app = create_test_app().await;
    let (_, trainer_token, _, client_token, plan_id) = plan_fixture(&app).await;
    let today = days_from_today(0);

    AxumTestRequest::post(&format!("/api/plans/{plan_id}/days/{today}/complete"))
        .bearer(&client_token)
        .json(&json!({"photo": test_photo()}))
        .send(app.router())
        .await
        .assert_status(StatusCode::OK);

    let progress: Value = AxumTestRequest::get(&format!("/api/plans/{plan_id}/progress?date={today}"))
        .bearer(&trainer_token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(progress["reference_date"], today.to_string());
    assert!(progress["week"]["completed"].as_u64().unwrap() >= 1);
    assert!(progress["month"]["completed"].as_u64().unwrap() >= 1);
    assert_eq!(progress["week"]["failed"], 0);
}

#[tokio::test]
async fn test_delete_plan_by_owner() {
    let app = create_test_app().await;
    let (_, trainer_token, _, client_token, plan_id) = plan_fixture(&app).await;

    let by_client = AxumTestRequest::delete(&format!("/api/plans/{plan_id}"))
        .bearer(&client_token)
        .send(app.router())
        .await;
    assert_eq!(by_client.status(), 403);

    AxumTestRequest::delete(&format!("/api/plans/{plan_id}"))
        .bearer(&trainer_token)
        .send(app.router())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let gone = AxumTestRequest::get(&format!("/api/plans/{plan_id}"))
        .bearer(&trainer_token)
        .send(app.router())
        .await;
    assert_eq!(gone.status(), 404);
}

#[tokio::test]
async fn test_malformed_fail_body_is_rejected() {
    let app = create_test_app().await;
    let (_, _, _, client_token, plan_id) = plan_fixture(&app).await;
    let today = days_from_today(0);

    let malformed = AxumTestRequest::post(&format!("/api/plans/{plan_id}/days/{today}/fail"))
        .bearer(&client_token)
        .json(&json!({"reason": 5}))
        .send(app.router())
        .await;
    assert_eq!(malformed.status(), 400);
    assert_eq!(malformed.error_code(), "INVALID_FORMAT");

    let plan: Value = AxumTestRequest::get(&format!("/api/plans/{plan_id}"))
        .bearer(&client_token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert!(plan["days"]
        .as_array()
        .unwrap()
        .iter()
        .all(|day| day["status"] == "pending"));
}

// ============================================================================
// Logs
// ============================================================================

#[tokio::test]
async fn test_log_list_filters() {
    let app = create_test_app().await;
    let (_, trainer_token, client, client_token, plan_id) = plan_fixture(&app).await;
    let yesterday = days_from_today(-1);
    let today = days_from_today(0);

    AxumTestRequest::post(&format!("/api/plans/{plan_id}/days/{yesterday}/fail"))
        .bearer(&client_token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK);
    AxumTestRequest::post(&format!("/api/plans/{plan_id}/days/{today}/complete"))
        .bearer(&client_token)
        .json(&json!({"photo": test_photo()}))
        .send(app.router())
        .await
        .assert_status(StatusCode::OK);

    let all: Vec<Value> = AxumTestRequest::get(&format!("/api/logs?client_id={}", client.id))
        .bearer(&trainer_token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(all.len(), 2);
    // Most recent day first
    assert_eq!(all[0]["date"], today.to_string());

    let from_today: Vec<Value> = AxumTestRequest::get(&format!("/api/logs?from={today}"))
        .bearer(&client_token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(from_today.len(), 1);
    assert_eq!(from_today[0]["status"], "completed");

    let until_yesterday: Vec<Value> = AxumTestRequest::get(&format!("/api/logs?to={yesterday}"))
        .bearer(&trainer_token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(until_yesterday.len(), 1);
    assert_eq!(until_yesterday[0]["status"], "failed");

    let inverted = AxumTestRequest::get(&format!("/api/logs?from={today}&to={yesterday}"))
        .bearer(&client_token)
        .send(app.router())
        .await;
    assert_eq!(inverted.status(), 400);

    let (stranger, _) =
        create_user(&app, UserRole::Client, "stranger@example.com", "Stranger").await;
    let foreign = AxumTestRequest::get(&format!("/api/logs?client_id={}", stranger.id))
        .bearer(&trainer_token)
        .send(app.router())
        .await;
    assert_eq!(foreign.status(), 403);
}
