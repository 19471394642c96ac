// ABOUTME: Main library entry point for the FitCoach personal training platform
// ABOUTME: Provides the REST API, realtime chat and storage used by the server binaries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

#![deny(unsafe_code)]

//! # FitCoach Server
//!
//! Backend for a personal training platform. Trainers author workout
//! templates and plans for their clients; clients complete or fail each
//! scheduled day with photo proof; admins moderate trainers and accounts.
//!
//! ## Features
//!
//! - **Roles**: client, trainer (admin-approved), admin
//! - **Plans**: day-by-day workouts with a one-way `pending → completed | failed` status
//! - **Progress**: calendar month view and week/month completion ratios
//! - **Matching**: clients pick a trainer and may request a change
//! - **Notifications**: in-app notices for every state change that concerns a user
//! - **Chat**: one-to-one conversations over REST and WebSocket
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use fitcoach_server::config::ServerConfig;
//! use fitcoach_server::database::Database;
//! use fitcoach_server::mailer::LogMailer;
//! use fitcoach_server::resources::ServerResources;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Arc::new(ServerConfig::from_env()?);
//!     let database = Database::new(&config.database.url).await?;
//!     let resources = Arc::new(ServerResources::new(database, config, Arc::new(LogMailer)));
//!     fitcoach_server::server::run(resources).await
//! }
//! ```

/// JWT issuing, validation and password hashing
pub mod auth;

/// Environment-based configuration
pub mod config;

/// Application constants and defaults
pub mod constants;

/// `SQLite` document store
pub mod database;

/// Unified error handling
pub mod errors;

/// Structured logging setup
pub mod logging;

/// Outgoing email abstraction
pub mod mailer;

/// Authentication, role guards, CORS and request tracing
pub mod middleware;

/// Shared resource container injected into routes
pub mod resources;

/// HTTP route groups
pub mod routes;

/// Router assembly and server lifecycle
pub mod server;

/// Domain services shared by several routes
pub mod services;

/// Cookie, validation and photo helpers
pub mod utils;

/// Realtime chat hub and WebSocket connection manager
pub mod websocket;
