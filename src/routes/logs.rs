// ABOUTME: Workout log route handlers listing the history written by day transitions
// ABOUTME: Clients see their own logs, trainers their clients' logs, admins everything
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::LogFilter;
use crate::errors::{AppError, AppResult};
use crate::middleware::{load_user, require_approved_trainer};
use crate::resources::ServerResources;
use crate::services::access::{client_for_viewer, resolve_client_scope};
use fitcoach_core::permissions::UserRole;

/// Log list filter
#[derive(Debug, Default, Deserialize)]
pub struct LogQuery {
    /// Restrict to one client
    pub client_id: Option<Uuid>,
    /// First date, `YYYY-MM-DD`
    pub from: Option<String>,
    /// Last date, `YYYY-MM-DD`
    pub to: Option<String>,
}

impl LogQuery {
    fn date_range(&self) -> AppResult<LogFilter> {
        let from = self
            .from
            .as_deref()
            .map(|d| super::parse_date(d, "from"))
            .transpose()?;
        let to = self
            .to
            .as_deref()
            .map(|d| super::parse_date(d, "to"))
            .transpose()?;
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(AppError::invalid_input("'from' must not be after 'to'"));
            }
        }
        Ok(LogFilter {
            from,
            to,
            ..LogFilter::default()
        })
    }
}

/// Workout log routes
pub struct LogRoutes;

impl LogRoutes {
    /// Create all log routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/logs", get(Self::handle_list))
            .route("/api/logs/:id", get(Self::handle_get))
            .with_state(resources)
    }

    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<LogQuery>,
    ) -> Result<Response, AppError> {
        let auth = super::authenticate(&headers, &resources).await?;
        let viewer = load_user(auth.user_id, &resources.database).await?;
        let mut filter = query.date_range()?;

        match (viewer.role, query.client_id) {
            (UserRole::Client, _) => filter.client_id = Some(viewer.id),
            (UserRole::Trainer, None) => {
                let trainer = require_approved_trainer(viewer.id, &resources.database).await?;
                filter.coached_by = Some(trainer.id);
            }
            (_, Some(client_id)) => {
                let client =
                    resolve_client_scope(&viewer, Some(client_id), &resources.database).await?;
                filter.client_id = Some(client.id);
            }
            (UserRole::Admin, None) => {}
        }

        let logs = resources.database.list_logs(filter).await?;
        Ok((StatusCode::OK, Json(logs)).into_response())
    }

    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(log_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = super::authenticate(&headers, &resources).await?;
        let log_id = super::parse_id(&log_id, "log")?;
        let viewer = load_user(auth.user_id, &resources.database).await?;

        let log = resources
            .database
            .get_log(log_id)
            .await?
            .ok_or_else(|| AppError::not_found("Workout log"))?;

        client_for_viewer(&viewer, log.client_id, &resources.database).await?;

        Ok((StatusCode::OK, Json(log)).into_response())
    }
}
