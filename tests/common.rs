// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides in-memory resources, account creation and token helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `fitcoach_server`
//!
//! Every test gets its own in-memory database, so tests never share state.

use std::sync::{Arc, Once};

use axum::Router;
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{Duration, NaiveDate, Utc};
use fitcoach_core::models::{TrainerStatus, User};
use fitcoach_core::permissions::UserRole;
use fitcoach_server::{
    config::ServerConfig, database::Database, mailer::RecordingMailer, resources::ServerResources,
    server::build_router,
};

/// Password given to every account created through these helpers
pub const TEST_PASSWORD: &str = "Password123!";

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Configuration for tests: fixed secret, cheap bcrypt, in-memory database
pub fn test_config() -> ServerConfig {
    ServerConfig::from_lookup(|key| match key {
        "JWT_SECRET" => Some("test-secret-that-is-long-enough-for-hs256".to_owned()),
        "BCRYPT_COST" => Some("4".to_owned()),
        "DATABASE_URL" => Some("sqlite::memory:".to_owned()),
        "MAX_PHOTO_BYTES" => Some("1024".to_owned()),
        "FRONTEND_URL" => Some("http://fitcoach.test".to_owned()),
        _ => None,
    })
    .expect("test configuration must be valid")
}

/// Standard test database setup
pub async fn create_test_database() -> Database {
    init_test_logging();
    Database::new("sqlite::memory:")
        .await
        .expect("in-memory database must open")
}

/// Resources and the recording mailer behind them
pub struct TestApp {
    /// Shared server resources
    pub resources: Arc<ServerResources>,
    /// Every email the server sent
    pub mailer: Arc<RecordingMailer>,
}

impl TestApp {
    /// Full application router, middleware included
    pub fn router(&self) -> Router {
        build_router(self.resources.clone())
    }

    /// Database behind the app
    pub fn database(&self) -> &Database {
        &self.resources.database
    }
}

/// Create a fresh application with its own database
pub async fn create_test_app() -> TestApp {
    let database = create_test_database().await;
    let mailer = Arc::new(RecordingMailer::new());
    let resources = Arc::new(ServerResources::new(
        database,
        Arc::new(test_config()),
        mailer.clone(),
    ));
    TestApp { resources, mailer }
}

/// Insert an account and issue a token for it
pub async fn create_user(app: &TestApp, role: UserRole, email: &str, name: &str) -> (User, String) {
    let password_hash = app
        .resources
        .auth_manager
        .hash_password(TEST_PASSWORD.to_owned())
        .await
        .unwrap();
    let user = User::new(email, password_hash, name.to_owned(), role);
    app.database().create_user(&user).await.unwrap();
    let token = token_for(app, &user);
    (user, token)
}

/// Issue a JWT for an existing account
pub fn token_for(app: &TestApp, user: &User) -> String {
    app.resources.auth_manager.generate_token(user).unwrap().0
}

/// Admin account with a token
pub async fn create_admin(app: &TestApp) -> (User, String) {
    create_user(app, UserRole::Admin, "admin@fitcoach.test", "Admin").await
}

/// Trainer whose application is already approved
pub async fn create_approved_trainer(app: &TestApp, email: &str) -> (User, String) {
    let (mut trainer, token) = create_user(app, UserRole::Trainer, email, "Coach").await;
    app.database()
        .decide_trainer_application(trainer.id, TrainerStatus::Approved, None)
        .await
        .unwrap();
    trainer.trainer_status = TrainerStatus::Approved;
    (trainer, token)
}

/// Client already assigned to `trainer`
pub async fn create_client_of(app: &TestApp, trainer: &User, email: &str) -> (User, String) {
    let (mut client, token) = create_user(app, UserRole::Client, email, "Client").await;
    assert!(app
        .database()
        .assign_trainer_if_unassigned(client.id, trainer.id)
        .await
        .unwrap());
    client.trainer_id = Some(trainer.id);
    (client, token)
}

/// A small valid photo as a data URL
pub fn test_photo() -> String {
    format!(
        "data:image/png;base64,{}",
        STANDARD.encode([0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a])
    )
}

/// Date `days` away from today (negative for the past)
pub fn days_from_today(days: i64) -> NaiveDate {
    Utc::now().date_naive() + Duration::days(days)
}
