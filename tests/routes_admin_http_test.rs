// ABOUTME: HTTP integration tests for admin moderation routes
// ABOUTME: Covers trainer application review, suspension, deletion and platform stats
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use common::{create_admin, create_approved_trainer, create_client_of, create_test_app, create_user};
use fitcoach_core::permissions::UserRole;
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};

#[tokio::test]
async fn test_admin_routes_require_admin_role() {
    let app = create_test_app().await;
    let (_, client_token) = create_user(&app, UserRole::Client, "client@example.com", "Client").await;

    let response = AxumTestRequest::get("/api/admin/users")
        .bearer(&client_token)
        .send(app.router())
        .await;
    assert_eq!(response.status(), 403);

    let anonymous = AxumTestRequest::get("/api/admin/stats").send(app.router()).await;
    assert_eq!(anonymous.status(), 401);
}

#[tokio::test]
async fn test_approve_trainer_application() {
    let app = create_test_app().await;
    let (_, admin_token) = create_admin(&app).await;
    let (trainer, trainer_token) =
        create_user(&app, UserRole::Trainer, "coach@example.com", "Coach").await;

    let applications: Vec<Value> = AxumTestRequest::get("/api/admin/trainer-applications")
        .bearer(&admin_token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(applications.len(), 1);
    assert_eq!(applications[0]["id"], trainer.id.to_string());

    let approved: Value = AxumTestRequest::post(&format!("/api/admin/trainers/{}/approve", trainer.id))
        .bearer(&admin_token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(approved["trainer_status"], "approved");

    let again = AxumTestRequest::post(&format!("/api/admin/trainers/{}/approve", trainer.id))
        .bearer(&admin_token)
        .send(app.router())
        .await;
    assert_eq!(again.status(), 409);

    let notifications: Vec<Value> = AxumTestRequest::get("/api/notifications")
        .bearer(&trainer_token)
        .send(app.router())
        .await
        .json();
    assert_eq!(notifications[0]["kind"], "trainer_approved");

    // Approved trainers can now author templates
    AxumTestRequest::post("/api/templates")
        .bearer(&trainer_token)
        .json(&json!({"name": "Core", "exercises": [{"name": "Plank", "sets": 3, "reps": 1}]}))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn test_reject_trainer_application_with_reason() {
    let app = create_test_app().await;
    let (_, admin_token) = create_admin(&app).await;
    let (trainer, trainer_token) =
        create_user(&app, UserRole::Trainer, "coach@example.com", "Coach").await;

    let malformed = AxumTestRequest::post(&format!("/api/admin/trainers/{}/reject", trainer.id))
        .bearer(&admin_token)
        .json(&json!({"reason": ["not", "text"]}))
        .send(app.router())
        .await;
    assert_eq!(malformed.status(), 400);

    let rejected: Value = AxumTestRequest::post(&format!("/api/admin/trainers/{}/reject", trainer.id))
        .bearer(&admin_token)
        .json(&json!({"reason": "Missing certification"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(rejected["trainer_status"], "rejected");
    assert_eq!(rejected["rejection_reason"], "Missing certification");

    let notifications: Vec<Value> = AxumTestRequest::get("/api/notifications")
        .bearer(&trainer_token)
        .send(app.router())
        .await
        .json();
    assert_eq!(notifications[0]["kind"], "trainer_rejected");
    assert!(notifications[0]["message"]
        .as_str()
        .unwrap()
        .contains("Missing certification"));

    let templates = AxumTestRequest::get("/api/templates")
        .bearer(&trainer_token)
        .send(app.router())
        .await;
    assert_eq!(templates.status(), 403);
}

#[tokio::test]
async fn test_suspend_and_reactivate_account() {
    let app = create_test_app().await;
    let (_, admin_token) = create_admin(&app).await;
    let (client, client_token) =
        create_user(&app, UserRole::Client, "client@example.com", "Client").await;

    let suspended: Value = AxumTestRequest::post(&format!("/api/admin/users/{}/suspend", client.id))
        .bearer(&admin_token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(suspended["status"], "suspended");

    let blocked = AxumTestRequest::get("/api/auth/me")
        .bearer(&client_token)
        .send(app.router())
        .await;
    assert_eq!(blocked.status(), 403);

    AxumTestRequest::post(&format!("/api/admin/users/{}/activate", client.id))
        .bearer(&admin_token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK);

    let me: Value = AxumTestRequest::get("/api/auth/me")
        .bearer(&client_token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(me["status"], "active");
}

#[tokio::test]
async fn test_admin_cannot_moderate_self() {
    let app = create_test_app().await;
    let (admin, admin_token) = create_admin(&app).await;

    let suspend = AxumTestRequest::post(&format!("/api/admin/users/{}/suspend", admin.id))
        .bearer(&admin_token)
        .send(app.router())
        .await;
    assert_eq!(suspend.status(), 400);

    let delete = AxumTestRequest::delete(&format!("/api/admin/users/{}", admin.id))
        .bearer(&admin_token)
        .send(app.router())
        .await;
    assert_eq!(delete.status(), 400);
}

#[tokio::test]
async fn test_delete_trainer_unassigns_clients() {
    let app = create_test_app().await;
    let (_, admin_token) = create_admin(&app).await;
    let (trainer, _) = create_approved_trainer(&app, "coach@example.com").await;
    let (client, _) = create_client_of(&app, &trainer, "client@example.com").await;

    AxumTestRequest::delete(&format!("/api/admin/users/{}", trainer.id))
        .bearer(&admin_token)
        .send(app.router())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    assert!(app.database().get_user(trainer.id).await.unwrap().is_none());
    let client = app.database().get_user(client.id).await.unwrap().unwrap();
    assert!(client.trainer_id.is_none());
}

#[tokio::test]
async fn test_user_listing_filters_and_stats() {
    let app = create_test_app().await;
    let (_, admin_token) = create_admin(&app).await;
    let (trainer, _) = create_approved_trainer(&app, "coach@example.com").await;
    create_client_of(&app, &trainer, "one@example.com").await;
    create_client_of(&app, &trainer, "two@example.com").await;

    let clients: Vec<Value> = AxumTestRequest::get("/api/admin/users?role=client")
        .bearer(&admin_token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(clients.len(), 2);
    assert!(clients.iter().all(|user| user["role"] == "client"));

    let stats: Value = AxumTestRequest::get("/api/admin/stats")
        .bearer(&admin_token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(stats["total_users"], 4);
    assert_eq!(stats["clients"], 2);
    assert_eq!(stats["trainers"], 1);
}
