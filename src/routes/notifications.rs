// ABOUTME: In-app notification route handlers scoped to the authenticated recipient
// ABOUTME: List, count unread, mark one or all read, and delete notifications
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::constants::limits::clamp_page_size;
use crate::errors::AppError;
use crate::resources::ServerResources;

/// Listing parameters
#[derive(Debug, Default, Deserialize)]
pub struct NotificationQuery {
    /// Only unread notifications
    #[serde(default)]
    pub unread_only: bool,
    /// Page size, 1..=100
    pub limit: Option<i64>,
}

/// Notification routes
pub struct NotificationRoutes;

impl NotificationRoutes {
    /// Create all notification routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/notifications", get(Self::handle_list))
            .route(
                "/api/notifications/unread-count",
                get(Self::handle_unread_count),
            )
            .route("/api/notifications/read-all", post(Self::handle_read_all))
            .route("/api/notifications/:id/read", post(Self::handle_mark_read))
            .route("/api/notifications/:id", delete(Self::handle_delete))
            .with_state(resources)
    }

    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<NotificationQuery>,
    ) -> Result<Response, AppError> {
        let auth = super::authenticate(&headers, &resources).await?;
        let notifications = resources
            .database
            .list_notifications(auth.user_id, query.unread_only, clamp_page_size(query.limit))
            .await?;
        Ok((StatusCode::OK, Json(notifications)).into_response())
    }

    async fn handle_unread_count(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = super::authenticate(&headers, &resources).await?;
        let count = resources
            .database
            .unread_notification_count(auth.user_id)
            .await?;
        Ok((StatusCode::OK, Json(serde_json::json!({ "count": count }))).into_response())
    }

    async fn handle_mark_read(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(notification_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = super::authenticate(&headers, &resources).await?;
        let notification_id = super::parse_id(&notification_id, "notification")?;
        resources
            .database
            .mark_notification_read(notification_id, auth.user_id)
            .await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    async fn handle_read_all(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = super::authenticate(&headers, &resources).await?;
        let updated = resources
            .database
            .mark_all_notifications_read(auth.user_id)
            .await?;
        Ok((StatusCode::OK, Json(serde_json::json!({ "updated": updated }))).into_response())
    }

    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(notification_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = super::authenticate(&headers, &resources).await?;
        let notification_id = super::parse_id(&notification_id, "notification")?;
        resources
            .database
            .delete_notification(notification_id, auth.user_id)
            .await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
