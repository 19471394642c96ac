// ABOUTME: SQLite document store for users, plans, logs, requests, notifications and chats
// ABOUTME: Owns the connection pool and creates every table idempotently at startup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! # Database Management
//!
//! Each aggregate is one row. Lists without an independent lifecycle
//! (template and day exercises, profile fields) are stored as JSON text;
//! plan days have their own table so a status transition is a single
//! conditional `UPDATE`.
//!
//! Identifiers are stored as hyphenated UUID text.

mod change_requests;
mod chat;
mod logs;
mod notifications;
mod password_resets;
mod plans;
mod stats;
mod templates;
mod users;

use std::str::FromStr;
use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use uuid::Uuid;

pub use change_requests::ChangeRequestFilter;
pub use logs::LogFilter;
pub use plans::PlanFilter;
pub use stats::AdminStats;
pub use users::UserFilter;

use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;

/// Database manager shared by every route through `ServerResources`
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect and run migrations.
    ///
    /// In-memory databases are held by a single connection that is never
    /// recycled, so every query sees the same data.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the connection fails, or a
    /// migration fails
    pub async fn new(database_url: &str) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::config(format!("Invalid DATABASE_URL: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true);

        let is_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");
        let pool_options = if is_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(8)
        };

        let pool = pool_options.connect_with(options).await?;
        let database = Self { pool };
        database.migrate().await?;
        Ok(database)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any table or index cannot be created
    pub async fn migrate(&self) -> AppResult<()> {
        let started = Instant::now();
        self.migrate_users().await?;
        self.migrate_templates().await?;
        self.migrate_plans().await?;
        self.migrate_logs().await?;
        self.migrate_change_requests().await?;
        self.migrate_notifications().await?;
        self.migrate_chat().await?;
        self.migrate_password_resets().await?;
        AppLogger::log_database_operation(
            "migrate",
            "*",
            true,
            u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        );
        Ok(())
    }

    /// Check that the database answers queries
    ///
    /// # Errors
    ///
    /// Returns an error if the probe query fails
    pub async fn health_check(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Parse a stored UUID column
pub(crate) fn parse_uuid(value: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| AppError::database(format!("Corrupt identifier '{value}': {e}")))
}

/// Parse an optional stored UUID column
pub(crate) fn parse_optional_uuid(value: Option<String>) -> AppResult<Option<Uuid>> {
    value.as_deref().map(parse_uuid).transpose()
}

/// Serialize a nested value into a JSON text column
pub(crate) fn to_json_column<T: Serialize>(value: &T) -> AppResult<String> {
    Ok(serde_json::to_string(value)?)
}

/// Deserialize a JSON text column
pub(crate) fn from_json_column<T: DeserializeOwned>(value: &str) -> AppResult<T> {
    serde_json::from_str(value)
        .map_err(|e| AppError::database(format!("Corrupt JSON column: {e}")))
}
