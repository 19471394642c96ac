// ABOUTME: Real-time chat over WebSocket with per-chat broadcast rooms
// ABOUTME: Handles socket authentication, room membership, live messages and typing signals
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! `WebSocket` chat transport
//!
//! One [`ChatHub`] per process holds a `broadcast` channel per chat room.
//! A room is created on first join and removed once its last subscriber
//! leaves. Messages are always persisted first; the hub only carries them to
//! sockets currently joined to the room.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::AuthResult;
use crate::database::Database;
use crate::errors::AppResult;
use crate::middleware::AuthMiddleware;
use crate::services::messaging;
use fitcoach_core::models::Message;

// WebSocket message type alias for Axum
type WsMessage = axum::extract::ws::Message;

/// Event carried through a chat room
#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// A persisted message
    Message(Message),
    /// A participant is typing
    Typing {
        /// Room
        chat_id: Uuid,
        /// Typist
        user_id: Uuid,
    },
}

/// Registry of live chat rooms
pub struct ChatHub {
    rooms: DashMap<Uuid, broadcast::Sender<ChatEvent>>,
    capacity: usize,
}

impl ChatHub {
    /// Create a hub whose rooms buffer `capacity` events per subscriber
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            rooms: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Subscribe to a room, creating it if needed
    #[must_use]
    pub fn subscribe(&self, chat_id: Uuid) -> broadcast::Receiver<ChatEvent> {
        self.rooms
            .entry(chat_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Send an event to a room, returning how many subscribers received it
    pub fn publish(&self, chat_id: Uuid, event: ChatEvent) -> usize {
        self.rooms
            .get(&chat_id)
            .map_or(0, |sender| sender.send(event).unwrap_or(0))
    }

    /// Drop a room once nobody is subscribed to it
    pub fn release(&self, chat_id: Uuid) {
        self.rooms
            .remove_if(&chat_id, |_, sender| sender.receiver_count() == 0);
    }

    /// Number of live rooms
    #[must_use]
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Subscribers currently joined to a room
    #[must_use]
    pub fn subscriber_count(&self, chat_id: Uuid) -> usize {
        self.rooms
            .get(&chat_id)
            .map_or(0, |sender| sender.receiver_count())
    }
}

/// Frames sent by the browser
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Authenticate the socket with a JWT
    Auth {
        /// JWT, with or without the `Bearer ` prefix
        token: String,
    },
    /// Start receiving a chat's messages
    Join {
        /// Chat to join
        chat_id: Uuid,
    },
    /// Stop receiving a chat's messages
    Leave {
        /// Chat to leave
        chat_id: Uuid,
    },
    /// Persist and broadcast a message
    Send {
        /// Target chat
        chat_id: Uuid,
        /// Message body
        content: String,
    },
    /// Tell the other participant you are typing
    Typing {
        /// Chat being typed in
        chat_id: Uuid,
    },
}

/// Frames sent to the browser
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Confirmation of a client frame
    Success {
        /// Human readable confirmation
        message: String,
    },
    /// A client frame was refused
    Error {
        /// Error description
        message: String,
    },
    /// New message in a joined chat
    Message {
        /// The persisted message
        message: Message,
    },
    /// Someone is typing in a joined chat
    Typing {
        /// Chat id
        chat_id: Uuid,
        /// Typist
        user_id: Uuid,
    },
}

impl ServerMessage {
    fn success(message: impl Into<String>) -> Self {
        Self::Success {
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Frame for a room event as seen by `viewer`; own typing signals are skipped
    fn for_viewer(event: ChatEvent, viewer: Uuid) -> Option<Self> {
        match event {
            ChatEvent::Message(message) => Some(Self::Message { message }),
            ChatEvent::Typing { user_id, .. } if user_id == viewer => None,
            ChatEvent::Typing { chat_id, user_id } => Some(Self::Typing { chat_id, user_id }),
        }
    }
}

#[derive(Debug)]
struct ClientConnection {
    user_id: Option<Uuid>,
}

/// Per-socket state owned by the connection loop
struct Session {
    connection_id: Uuid,
    user_id: Option<Uuid>,
    rooms: HashMap<Uuid, JoinHandle<()>>,
    tx: mpsc::UnboundedSender<WsMessage>,
}

/// Manages WebSocket connections and chat room membership
#[derive(Clone)]
pub struct WebSocketManager {
    database: Arc<Database>,
    auth_middleware: Arc<AuthMiddleware>,
    hub: Arc<ChatHub>,
    clients: Arc<RwLock<HashMap<Uuid, ClientConnection>>>,
}

impl WebSocketManager {
    /// Creates a new WebSocket manager instance
    #[must_use]
    pub fn new(
        database: Arc<Database>,
        auth_middleware: Arc<AuthMiddleware>,
        hub: Arc<ChatHub>,
    ) -> Self {
        Self {
            database,
            auth_middleware,
            hub,
            clients: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of open sockets
    pub async fn active_connections(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Number of open sockets that have authenticated
    pub async fn authenticated_connections(&self) -> usize {
        self.clients
            .read()
            .await
            .values()
            .filter(|client| client.user_id.is_some())
            .count()
    }

    /// Authenticate the upgrade request from its cookie or Authorization header
    pub async fn authenticate_upgrade(&self, headers: &http::HeaderMap) -> Option<AuthResult> {
        self.auth_middleware
            .authenticate_request_with_headers(headers)
            .await
            .ok()
    }

    /// Handle incoming WebSocket connection.
    ///
    /// `user_id` is set when the upgrade request already carried valid
    /// credentials; otherwise the socket must send an `auth` frame first.
    pub async fn handle_connection(&self, ws: axum::extract::ws::WebSocket, user_id: Option<Uuid>) {
        let (mut ws_tx, mut ws_rx) = ws.split();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut session = Session {
            connection_id: Uuid::new_v4(),
            user_id,
            rooms: HashMap::new(),
            tx,
        };
        self.clients
            .write()
            .await
            .insert(session.connection_id, ClientConnection { user_id });
        info!(connection_id = %session.connection_id, authenticated = user_id.is_some(), "WebSocket connected");

        // Spawn task to forward messages to `WebSocket`
        let ws_send_task = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                if ws_tx.send(message).await.is_err() {
                    break;
                }
            }
        });

        // Handle incoming messages
        while let Some(msg) = ws_rx.next().await {
            match msg {
                Ok(WsMessage::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(frame) => self.handle_frame(&mut session, frame).await,
                    Err(e) => {
                        send_frame(
                            &session.tx,
                            &ServerMessage::error(format!("Invalid message format: {e}")),
                        );
                    }
                },
                Ok(WsMessage::Close(_)) | Err(_) => break,
                _ => {}
            }
        }

        // Clean up on disconnect
        let rooms: Vec<Uuid> = session.rooms.keys().copied().collect();
        for chat_id in rooms {
            self.leave_room(&mut session, chat_id).await;
        }
        ws_send_task.abort();
        self.clients.write().await.remove(&session.connection_id);
        info!(connection_id = %session.connection_id, "WebSocket disconnected");
    }

    async fn handle_frame(&self, session: &mut Session, frame: ClientMessage) {
        if let ClientMessage::Auth { token } = frame {
            self.handle_auth(session, &token).await;
            return;
        }

        let Some(user_id) = session.user_id else {
            send_frame(&session.tx, &ServerMessage::error("Authentication required"));
            return;
        };

        let result = match frame {
            ClientMessage::Join { chat_id } => self.join_room(session, user_id, chat_id).await,
            ClientMessage::Leave { chat_id } => {
                self.leave_room(session, chat_id).await;
                Ok(ServerMessage::success("Left chat"))
            }
            ClientMessage::Send { chat_id, content } => {
                messaging::post_message(&self.database, &self.hub, chat_id, user_id, &content)
                    .await
                    .map(|_| ServerMessage::success("Message sent"))
            }
            ClientMessage::Typing { chat_id } => {
                if session.rooms.contains_key(&chat_id) {
                    self.hub
                        .publish(chat_id, ChatEvent::Typing { chat_id, user_id });
                    return;
                }
                Ok(ServerMessage::error("Join the chat before sending typing signals"))
            }
            ClientMessage::Auth { .. } => return,
        };

        let reply = result.unwrap_or_else(|e| ServerMessage::error(e.message));
        send_frame(&session.tx, &reply);
    }

    async fn handle_auth(&self, session: &mut Session, token: &str) {
        let token = token.strip_prefix("Bearer ").unwrap_or(token);
        match self.auth_middleware.authenticate_token(token).await {
            Ok(auth) => {
                if session.user_id.is_some_and(|current| current != auth.user_id) {
                    // Rooms joined as another user must not leak into this identity
                    let rooms: Vec<Uuid> = session.rooms.keys().copied().collect();
                    for chat_id in rooms {
                        self.leave_room(session, chat_id).await;
                    }
                }
                session.user_id = Some(auth.user_id);
                if let Some(client) = self.clients.write().await.get_mut(&session.connection_id) {
                    client.user_id = Some(auth.user_id);
                }
                send_frame(&session.tx, &ServerMessage::success("Authentication successful"));
            }
            Err(e) => {
                send_frame(
                    &session.tx,
                    &ServerMessage::error(format!("Authentication failed: {}", e.message)),
                );
            }
        }
    }

    async fn join_room(
        &self,
        session: &mut Session,
        user_id: Uuid,
        chat_id: Uuid,
    ) -> AppResult<ServerMessage> {
        messaging::chat_for_participant(&self.database, chat_id, user_id).await?;

        if session.rooms.contains_key(&chat_id) {
            return Ok(ServerMessage::success("Already joined chat"));
        }

        let mut events = self.hub.subscribe(chat_id);
        let tx = session.tx.clone();
        let forwarder = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        if let Some(frame) = ServerMessage::for_viewer(event, user_id) {
                            if !send_frame(&tx, &frame) {
                                break;
                            }
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(chat_id = %chat_id, skipped, "WebSocket subscriber lagged behind chat room");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
        session.rooms.insert(chat_id, forwarder);
        debug!(chat_id = %chat_id, user_id = %user_id, "Joined chat room");
        Ok(ServerMessage::success("Joined chat"))
    }

    async fn leave_room(&self, session: &mut Session, chat_id: Uuid) {
        if let Some(forwarder) = session.rooms.remove(&chat_id) {
            forwarder.abort();
            // Wait for the receiver to drop so the room can be released
            let _ = forwarder.await;
            self.hub.release(chat_id);
        }
    }
}

/// Serialize and queue a frame; returns `false` when the socket is gone
fn send_frame(tx: &mpsc::UnboundedSender<WsMessage>, frame: &ServerMessage) -> bool {
    match serde_json::to_string(frame) {
        Ok(json) => tx.send(WsMessage::Text(json)).is_ok(),
        Err(e) => {
            warn!(error = %e, "Failed to serialize WebSocket frame");
            true
        }
    }
}
