// ABOUTME: Chat REST route handlers for one-to-one conversations
// ABOUTME: Open a chat, list chats, page through messages, post messages and mark them read
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! Chat routes
//!
//! Messages posted here are persisted and then published to the chat's
//! live room, exactly like messages sent over the WebSocket.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::constants::limits::clamp_page_size;
use crate::errors::{AppError, AppResult};
use crate::middleware::load_user;
use crate::resources::ServerResources;
use crate::services::messaging;

/// Open a conversation
#[derive(Debug, Deserialize)]
pub struct CreateChatRequest {
    /// The other participant
    pub participant_id: Uuid,
}

/// Post a message
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    /// Message text
    #[serde(default)]
    pub content: String,
}

/// Message page parameters
#[derive(Debug, Default, Deserialize)]
pub struct MessagesQuery {
    /// RFC 3339 timestamp; only older messages are returned
    pub before: Option<String>,
    /// Page size, 1..=100
    pub limit: Option<i64>,
}

fn parse_before(value: Option<&str>) -> AppResult<Option<DateTime<Utc>>> {
    value
        .map(|raw| {
            DateTime::parse_from_rfc3339(raw.trim())
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| AppError::invalid_format("'before' must be an RFC 3339 timestamp"))
        })
        .transpose()
}

/// Chat routes
pub struct ChatRoutes;

impl ChatRoutes {
    /// Create all chat routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/chats",
                get(Self::handle_list_chats).post(Self::handle_create_chat),
            )
            .route("/api/chats/unread-count", get(Self::handle_unread_count))
            .route(
                "/api/chats/:id/messages",
                get(Self::handle_list_messages).post(Self::handle_send_message),
            )
            .route("/api/chats/:id/read", post(Self::handle_mark_read))
            .with_state(resources)
    }

    async fn handle_create_chat(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<CreateChatRequest>,
    ) -> Result<Response, AppError> {
        let auth = super::authenticate(&headers, &resources).await?;
        let user = load_user(auth.user_id, &resources.database).await?;
        let chat = messaging::open_chat(&resources.database, &user, request.participant_id).await?;
        Ok((StatusCode::OK, Json(chat)).into_response())
    }

    async fn handle_list_chats(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = super::authenticate(&headers, &resources).await?;
        let chats = messaging::chat_summaries(&resources.database, auth.user_id).await?;
        Ok((StatusCode::OK, Json(chats)).into_response())
    }

    async fn handle_unread_count(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = super::authenticate(&headers, &resources).await?;
        let count = resources
            .database
            .total_unread_messages(auth.user_id)
            .await?;
        Ok((StatusCode::OK, Json(serde_json::json!({ "count": count }))).into_response())
    }

    async fn handle_list_messages(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(chat_id): Path<String>,
        Query(query): Query<MessagesQuery>,
    ) -> Result<Response, AppError> {
        let auth = super::authenticate(&headers, &resources).await?;
        let chat_id = super::parse_id(&chat_id, "chat")?;
        let before = parse_before(query.before.as_deref())?;

        messaging::chat_for_participant(&resources.database, chat_id, auth.user_id).await?;
        let messages = resources
            .database
            .list_messages(chat_id, before, clamp_page_size(query.limit))
            .await?;
        Ok((StatusCode::OK, Json(messages)).into_response())
    }

    async fn handle_send_message(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(chat_id): Path<String>,
        Json(request): Json<SendMessageRequest>,
    ) -> Result<Response, AppError> {
        let auth = super::authenticate(&headers, &resources).await?;
        let chat_id = super::parse_id(&chat_id, "chat")?;
        let message = messaging::post_message(
            &resources.database,
            &resources.chat_hub,
            chat_id,
            auth.user_id,
            &request.content,
        )
        .await?;
        Ok((StatusCode::CREATED, Json(message)).into_response())
    }

    async fn handle_mark_read(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(chat_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = super::authenticate(&headers, &resources).await?;
        let chat_id = super::parse_id(&chat_id, "chat")?;
        messaging::chat_for_participant(&resources.database, chat_id, auth.user_id).await?;
        let updated = resources
            .database
            .mark_chat_read(chat_id, auth.user_id)
            .await?;
        Ok((StatusCode::OK, Json(serde_json::json!({ "updated": updated }))).into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_before() {
        assert!(parse_before(None).unwrap().is_none());
        let parsed = parse_before(Some("2025-03-01T10:00:00Z")).unwrap().unwrap();
        assert_eq!(parsed.to_rfc3339(), "2025-03-01T10:00:00+00:00");
        assert!(parse_before(Some("yesterday")).is_err());
    }
}
