// ABOUTME: Centralized resource container for dependency injection into route handlers
// ABOUTME: Builds the database, auth, mailer, notifier and chat hub once per process
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! # Server Resources
//!
//! Every router receives one `Arc<ServerResources>` as its state, so shared
//! objects are created once at startup instead of per request.

use std::sync::Arc;

use crate::auth::AuthManager;
use crate::config::ServerConfig;
use crate::constants::limits::CHAT_ROOM_CAPACITY;
use crate::database::Database;
use crate::mailer::Mailer;
use crate::middleware::AuthMiddleware;
use crate::services::notifier::Notifier;
use crate::websocket::{ChatHub, WebSocketManager};

/// Centralized resource container for dependency injection
#[derive(Clone)]
pub struct ServerResources {
    /// Document store
    pub database: Arc<Database>,
    /// Token issuing and password hashing
    pub auth_manager: Arc<AuthManager>,
    /// Request authentication
    pub auth_middleware: Arc<AuthMiddleware>,
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
    /// Outgoing email
    pub mailer: Arc<dyn Mailer>,
    /// Best-effort notification writer
    pub notifier: Notifier,
    /// Live chat rooms
    pub chat_hub: Arc<ChatHub>,
    /// WebSocket connection manager
    pub websocket_manager: Arc<WebSocketManager>,
}

impl ServerResources {
    /// Create new server resources with proper Arc sharing
    #[must_use]
    pub fn new(database: Database, config: Arc<ServerConfig>, mailer: Arc<dyn Mailer>) -> Self {
        let database = Arc::new(database);
        let auth_manager = Arc::new(AuthManager::new(
            config.auth.jwt_secret.as_bytes(),
            config.auth.jwt_expiry_hours,
            config.auth.bcrypt_cost,
        ));
        let auth_middleware = Arc::new(AuthMiddleware::new(
            auth_manager.clone(),
            database.clone(),
        ));
        let chat_hub = Arc::new(ChatHub::new(CHAT_ROOM_CAPACITY));
        let websocket_manager = Arc::new(WebSocketManager::new(
            database.clone(),
            auth_middleware.clone(),
            chat_hub.clone(),
        ));

        Self {
            notifier: Notifier::new(database.clone()),
            database,
            auth_manager,
            auth_middleware,
            config,
            mailer,
            chat_hub,
            websocket_manager,
        }
    }
}
