// ABOUTME: HTTP integration tests for client data access after an approved trainer change
// ABOUTME: Plans, logs, calendar and chat follow the client's current trainer, not the author
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use common::{
    create_admin, create_approved_trainer, create_client_of, create_test_app, days_from_today,
    test_photo,
};
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};

fn day(offset: i64) -> Value {
    json!({
        "date": days_from_today(offset),
        "exercises": [{"name": "Row", "sets": 4, "reps": 8}]
    })
}

#[tokio::test]
async fn test_client_data_follows_reassignment() {
    let app = create_test_app().await;
    let (_, admin_token) = create_admin(&app).await;
    let (old_trainer, old_token) = create_approved_trainer(&app, "old@example.com").await;
    let (new_trainer, new_token) = create_approved_trainer(&app, "new@example.com").await;
    let (client, client_token) = create_client_of(&app, &old_trainer, "client@example.com").await;

    // History written while the old trainer coached the client
    let plan: Value = AxumTestRequest::post("/api/plans")
        .bearer(&old_token)
        .json(&json!({"client_id": client.id, "title": "Back block", "days": [day(-1), day(0)]}))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    let plan_id = plan["id"].as_str().unwrap().to_owned();
    let today = days_from_today(0);
    let yesterday = days_from_today(-1);

    AxumTestRequest::post(&format!("/api/plans/{plan_id}/days/{yesterday}/complete"))
        .bearer(&client_token)
        .json(&json!({"photo": test_photo()}))
        .send(app.router())
        .await
        .assert_status(StatusCode::OK);

    let chat: Value = AxumTestRequest::post("/api/chats")
        .bearer(&old_token)
        .json(&json!({"participant_id": client.id}))
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    let chat_id = chat["id"].as_str().unwrap().to_owned();

    // Move the client to the new trainer
    let created: Value = AxumTestRequest::post("/api/change-requests")
        .bearer(&client_token)
        .json(&json!({"requested_trainer_id": new_trainer.id, "reason": "Moving"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    AxumTestRequest::post(&format!(
        "/api/admin/change-requests/{}/approve",
        created["id"].as_str().unwrap()
    ))
    .bearer(&admin_token)
    .send(app.router())
    .await
    .assert_status(StatusCode::OK);

    // Logs
    let old_logs: Vec<Value> = AxumTestRequest::get("/api/logs")
        .bearer(&old_token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert!(old_logs.is_empty());

    let old_scoped = AxumTestRequest::get(&format!("/api/logs?client_id={}", client.id))
        .bearer(&old_token)
        .send(app.router())
        .await;
    assert_eq!(old_scoped.status(), 403);

    let new_logs: Vec<Value> = AxumTestRequest::get("/api/logs")
        .bearer(&new_token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(new_logs.len(), 1);
    let log_id = new_logs[0]["id"].as_str().unwrap().to_owned();

    AxumTestRequest::get(&format!("/api/logs/{log_id}"))
        .bearer(&new_token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK);
    let old_log = AxumTestRequest::get(&format!("/api/logs/{log_id}"))
        .bearer(&old_token)
        .send(app.router())
        .await;
    assert_eq!(old_log.status(), 403);

    // Plans
    let old_plan = AxumTestRequest::get(&format!("/api/plans/{plan_id}"))
        .bearer(&old_token)
        .send(app.router())
        .await;
    assert_eq!(old_plan.status(), 403);

    let old_list: Vec<Value> = AxumTestRequest::get("/api/plans")
        .bearer(&old_token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert!(old_list.is_empty());

    AxumTestRequest::get(&format!("/api/plans/{plan_id}"))
        .bearer(&new_token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK);

    let new_list: Vec<Value> = AxumTestRequest::get("/api/plans")
        .bearer(&new_token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(new_list.len(), 1);

    let old_append = AxumTestRequest::put(&format!("/api/plans/{plan_id}"))
        .bearer(&old_token)
        .json(&json!({"days": [day(3)]}))
        .send(app.router())
        .await;
    assert_eq!(old_append.status(), 403);

    let appended: Value = AxumTestRequest::put(&format!("/api/plans/{plan_id}"))
        .bearer(&new_token)
        .json(&json!({"days": [day(3)]}))
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(appended["days"].as_array().unwrap().len(), 3);

    // Calendar
    let old_calendar = AxumTestRequest::get(&format!("/api/calendar?client_id={}", client.id))
        .bearer(&old_token)
        .send(app.router())
        .await;
    assert_eq!(old_calendar.status(), 403);
    AxumTestRequest::get(&format!("/api/calendar?client_id={}", client.id))
        .bearer(&new_token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK);

    // Chat: the old pair keeps the history but can no longer write
    AxumTestRequest::get(&format!("/api/chats/{chat_id}/messages"))
        .bearer(&old_token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK);
    let old_message = AxumTestRequest::post(&format!("/api/chats/{chat_id}/messages"))
        .bearer(&old_token)
        .json(&json!({"content": "Still there?"}))
        .send(app.router())
        .await;
    assert_eq!(old_message.status(), 403);

    // New reports land with the current trainer
    let recorded: Value = AxumTestRequest::post(&format!("/api/plans/{plan_id}/days/{today}/fail"))
        .bearer(&client_token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(recorded["log"]["trainer_id"], new_trainer.id.to_string());

    let new_notifications: Vec<Value> = AxumTestRequest::get("/api/notifications")
        .bearer(&new_token)
        .send(app.router())
        .await
        .json();
    assert!(new_notifications
        .iter()
        .any(|n| n["kind"] == "workout_failed"));
}
