// ABOUTME: WebSocket route handler for real-time chat
// ABOUTME: Authenticates the upgrade request when it carries credentials and hands the socket to the manager
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use std::sync::Arc;

use axum::{
    extract::{
        ws::{WebSocket, WebSocketUpgrade},
        State,
    },
    http::HeaderMap,
    response::IntoResponse,
    routing::get,
    Router,
};
use tracing::{debug, info};

use crate::websocket::WebSocketManager;

/// WebSocket routes implementation
pub struct WebSocketRoutes;

impl WebSocketRoutes {
    /// Create the WebSocket route with the shared `WebSocketManager`
    pub fn routes(manager: Arc<WebSocketManager>) -> Router {
        Router::new()
            .route("/ws", get(Self::handle_websocket))
            .with_state(manager)
    }

    /// Upgrade the connection.
    ///
    /// A cookie or bearer header on the upgrade request authenticates the
    /// socket immediately; otherwise the client must send an `auth` frame
    /// before joining rooms.
    async fn handle_websocket(
        ws: WebSocketUpgrade,
        headers: HeaderMap,
        State(manager): State<Arc<WebSocketManager>>,
    ) -> impl IntoResponse {
        let auth = manager.authenticate_upgrade(&headers).await;
        info!(
            authenticated = auth.is_some(),
            "New WebSocket connection request"
        );

        ws.on_upgrade(move |socket: WebSocket| async move {
            debug!("WebSocket upgraded, delegating to manager");
            manager
                .handle_connection(socket, auth.map(|auth| auth.user_id))
                .await;
        })
    }
}
