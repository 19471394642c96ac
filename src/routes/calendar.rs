// ABOUTME: Calendar and progress route handlers aggregating day statuses across a client's plans
// ABOUTME: Month view grouped by date plus week and month completion ratios
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::middleware::load_user;
use crate::resources::ServerResources;
use crate::services::access::resolve_client_scope;
use fitcoach_core::models::{
    calendar_month, month_bounds, parse_month, week_bounds, CalendarDay, ProgressSummary,
};

/// Calendar parameters
#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    /// `YYYY-MM`, defaults to the current month
    pub month: Option<String>,
    /// Client to show; required for trainers and admins
    pub client_id: Option<Uuid>,
}

/// Progress parameters
#[derive(Debug, Default, Deserialize)]
pub struct ProgressQuery {
    /// `YYYY-MM-DD`, defaults to today
    pub date: Option<String>,
    /// Client to show; required for trainers and admins
    pub client_id: Option<Uuid>,
}

/// Month view of a client's scheduled days
#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    /// Month shown, `YYYY-MM`
    pub month: String,
    /// Client the days belong to
    pub client_id: Uuid,
    /// Dates with at least one scheduled day
    pub days: Vec<CalendarDay>,
}

/// Progress across every plan of a client
#[derive(Debug, Serialize)]
pub struct ClientProgressResponse {
    /// Client the ratios belong to
    pub client_id: Uuid,
    /// Week and month windows
    #[serde(flatten)]
    pub summary: ProgressSummary,
}

/// Calendar and progress routes
pub struct CalendarRoutes;

impl CalendarRoutes {
    /// Create calendar and progress routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/calendar", get(Self::handle_calendar))
            .route("/api/progress", get(Self::handle_progress))
            .with_state(resources)
    }

    async fn handle_calendar(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<CalendarQuery>,
    ) -> Result<Response, AppError> {
        let auth = super::authenticate(&headers, &resources).await?;
        let viewer = load_user(auth.user_id, &resources.database).await?;
        let client = resolve_client_scope(&viewer, query.client_id, &resources.database).await?;

        let (year, month) = match query.month.as_deref() {
            Some(value) => parse_month(value)?,
            None => {
                let today = Utc::now().date_naive();
                (today.year(), today.month())
            }
        };
        let (start, end) = month_bounds(year, month)?;
        let statuses = resources
            .database
            .day_statuses_for_client(client.id, start, end)
            .await?;

        Ok((
            StatusCode::OK,
            Json(CalendarResponse {
                month: format!("{year:04}-{month:02}"),
                client_id: client.id,
                days: calendar_month(year, month, &statuses)?,
            }),
        )
            .into_response())
    }

    async fn handle_progress(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ProgressQuery>,
    ) -> Result<Response, AppError> {
        let auth = super::authenticate(&headers, &resources).await?;
        let viewer = load_user(auth.user_id, &resources.database).await?;
        let client = resolve_client_scope(&viewer, query.client_id, &resources.database).await?;

        let reference = match query.date.as_deref() {
            Some(date) => super::parse_date(date, "date")?,
            None => Utc::now().date_naive(),
        };
        let (week_start, week_end) = week_bounds(reference);
        let (month_start, month_end) = month_bounds(reference.year(), reference.month())?;
        let statuses = resources
            .database
            .day_statuses_for_client(
                client.id,
                week_start.min(month_start),
                week_end.max(month_end),
            )
            .await?;

        Ok((
            StatusCode::OK,
            Json(ClientProgressResponse {
                client_id: client.id,
                summary: ProgressSummary::compute(reference, &statuses)?,
            }),
        )
            .into_response())
    }
}
