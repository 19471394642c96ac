// ABOUTME: Workout plan route handlers for trainers authoring plans and clients reporting days
// ABOUTME: Covers plan CRUD, completing or failing a day with photo proof, and per-plan progress
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! Workout plan routes
//!
//! A plan belongs to one trainer and one of their clients. Each day is
//! built either from a template owned by the trainer (exercises are copied)
//! or from explicit exercises. Day status changes go through
//! [`record_day_outcome`].

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::{Database, PlanFilter};
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::middleware::{load_user, require_approved_trainer, require_client};
use crate::resources::ServerResources;
use crate::routes::OptionalJson;
use crate::services::access::ensure_can_view_plan;
use crate::services::workout_days::{record_day_outcome, DayOutcome};
use crate::utils::validation::{optional_text, required_text};
use fitcoach_core::models::{
    month_bounds, week_bounds, DayStatus, Exercise, NewNotification, NotificationKind, PlanDay,
    ProgressSummary, User, WorkoutPlan,
};
use fitcoach_core::permissions::UserRole;

/// One day in a create or update request
#[derive(Debug, Clone, Deserialize)]
pub struct PlanDayRequest {
    /// Scheduled date
    pub date: NaiveDate,
    /// Optional title; defaults to the template name
    pub title: Option<String>,
    /// Template to copy exercises from
    pub template_id: Option<Uuid>,
    /// Explicit exercises when no template is used
    pub exercises: Option<Vec<Exercise>>,
}

/// Create a plan for a client
#[derive(Debug, Deserialize)]
pub struct CreatePlanRequest {
    /// Client the plan is for
    pub client_id: Uuid,
    /// Plan title
    pub title: String,
    /// Optional description
    pub description: Option<String>,
    /// Scheduled days
    #[serde(default)]
    pub days: Vec<PlanDayRequest>,
}

/// Update title or description and append days
#[derive(Debug, Deserialize)]
pub struct UpdatePlanRequest {
    /// New title
    pub title: Option<String>,
    /// New description; blank clears it
    pub description: Option<String>,
    /// Days to append
    #[serde(default)]
    pub days: Vec<PlanDayRequest>,
}

/// Plan list filter
#[derive(Debug, Default, Deserialize)]
pub struct PlanListQuery {
    /// Restrict to one client
    pub client_id: Option<Uuid>,
}

/// Completion of a day
#[derive(Debug, Deserialize)]
pub struct CompleteDayRequest {
    /// Base64 photo proof
    #[serde(default)]
    pub photo: String,
    /// Optional note
    pub note: Option<String>,
}

/// Failure of a day
#[derive(Debug, Default, Deserialize)]
pub struct FailDayRequest {
    /// Why the workout was missed
    pub reason: Option<String>,
    /// Optional photo
    pub photo: Option<String>,
}

/// Reference date for progress
#[derive(Debug, Default, Deserialize)]
pub struct ProgressQuery {
    /// `YYYY-MM-DD`, defaults to today
    pub date: Option<String>,
}

/// Reject dates repeated within `days` or already present in `existing`
fn ensure_unique_dates(days: &[PlanDayRequest], existing: &[PlanDay]) -> AppResult<()> {
    let mut seen: HashSet<NaiveDate> = existing.iter().map(|day| day.date).collect();
    for day in days {
        if !seen.insert(day.date) {
            return Err(AppError::already_exists(format!(
                "Plan already has a day on {}",
                day.date
            )));
        }
    }
    Ok(())
}

/// Turn request days into pending plan days, copying template exercises
async fn build_days(
    database: &Database,
    trainer_id: Uuid,
    plan_id: Uuid,
    requests: Vec<PlanDayRequest>,
) -> AppResult<Vec<PlanDay>> {
    let mut days = Vec::with_capacity(requests.len());

    for request in requests {
        let title = optional_text(request.title.as_deref(), "days[].title")?;
        let (title, exercises) = match (request.template_id, request.exercises) {
            (Some(_), Some(_)) => {
                return Err(AppError::invalid_input(format!(
                    "Day {} must use either a template or explicit exercises, not both",
                    request.date
                )))
            }
            (Some(template_id), None) => {
                let template = database
                    .get_template(template_id, trainer_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Template"))?;
                (title.or(Some(template.name)), template.exercises)
            }
            (None, Some(exercises)) => {
                Exercise::validate_all(&exercises)?;
                (title, exercises)
            }
            (None, None) => {
                return Err(AppError::invalid_input(format!(
                    "Day {} needs a template_id or exercises",
                    request.date
                )))
            }
        };

        days.push(PlanDay {
            id: Uuid::new_v4(),
            plan_id,
            date: request.date,
            title,
            template_id: request.template_id,
            exercises,
            status: DayStatus::Pending,
            log_id: None,
            status_changed_at: None,
        });
    }

    days.sort_by_key(|day| day.date);
    Ok(days)
}

/// Workout plan routes
pub struct PlanRoutes;

impl PlanRoutes {
    /// Create all plan routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/plans", get(Self::handle_list).post(Self::handle_create))
            .route(
                "/api/plans/:id",
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .route(
                "/api/plans/:id/days/:date/complete",
                post(Self::handle_complete_day),
            )
            .route("/api/plans/:id/days/:date/fail", post(Self::handle_fail_day))
            .route("/api/plans/:id/progress", get(Self::handle_progress))
            .with_state(resources)
    }

    /// Load a plan the viewer may see, with its client
    async fn visible_plan(
        resources: &ServerResources,
        viewer: &User,
        plan_id: &str,
    ) -> AppResult<(WorkoutPlan, User)> {
        let plan_id = super::parse_id(plan_id, "plan")?;
        let plan = resources
            .database
            .get_plan(plan_id)
            .await?
            .ok_or_else(|| AppError::not_found("Plan"))?;
        let client = ensure_can_view_plan(viewer, &plan, &resources.database).await?;
        Ok((plan, client))
    }

    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<CreatePlanRequest>,
    ) -> Result<Response, AppError> {
        let auth = super::authenticate(&headers, &resources).await?;
        let trainer = require_approved_trainer(auth.user_id, &resources.database).await?;

        let title = required_text(&request.title, "title")?;
        let description = optional_text(request.description.as_deref(), "description")?;
        if request.days.is_empty() {
            return Err(AppError::invalid_input("A plan needs at least one day"));
        }
        ensure_unique_dates(&request.days, &[])?;

        let client = resources
            .database
            .get_user(request.client_id)
            .await?
            .filter(|user| user.role == UserRole::Client)
            .ok_or_else(|| AppError::not_found("Client"))?;
        if !trainer.coaches(&client) {
            return Err(AppError::permission_denied(
                "Plans can only be assigned to your own clients",
            ));
        }

        let plan_id = Uuid::new_v4();
        let days = build_days(&resources.database, trainer.id, plan_id, request.days).await?;
        let now = Utc::now();
        let plan = WorkoutPlan {
            id: plan_id,
            client_id: client.id,
            trainer_id: trainer.id,
            title,
            description,
            days,
            created_at: now,
            updated_at: now,
        };
        resources.database.create_plan(&plan).await?;

        AppLogger::log_domain_event("plan", &plan.id.to_string(), "created", &trainer.id.to_string());
        resources
            .notifier
            .notify(
                NewNotification::new(
                    client.id,
                    NotificationKind::PlanAssigned,
                    "New workout plan",
                    format!("{} assigned you the plan \"{}\"", trainer.name, plan.title),
                )
                .related_to(plan.id),
            )
            .await;

        Ok((StatusCode::CREATED, Json(plan)).into_response())
    }

    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<PlanListQuery>,
    ) -> Result<Response, AppError> {
        let auth = super::authenticate(&headers, &resources).await?;
        let viewer = load_user(auth.user_id, &resources.database).await?;

        let filter = match viewer.role {
            UserRole::Client => PlanFilter {
                client_id: Some(viewer.id),
                coached_by: None,
            },
            UserRole::Trainer => {
                let trainer = require_approved_trainer(viewer.id, &resources.database).await?;
                PlanFilter {
                    client_id: query.client_id,
                    coached_by: Some(trainer.id),
                }
            }
            UserRole::Admin => PlanFilter {
                client_id: query.client_id,
                coached_by: None,
            },
        };

        let plans = resources.database.list_plans(filter).await?;
        Ok((StatusCode::OK, Json(plans)).into_response())
    }

    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(plan_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = super::authenticate(&headers, &resources).await?;
        let viewer = load_user(auth.user_id, &resources.database).await?;
        let (plan, _) = Self::visible_plan(&resources, &viewer, &plan_id).await?;
        Ok((StatusCode::OK, Json(plan)).into_response())
    }

    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(plan_id): Path<String>,
        Json(request): Json<UpdatePlanRequest>,
    ) -> Result<Response, AppError> {
        let auth = super::authenticate(&headers, &resources).await?;
        let trainer = require_approved_trainer(auth.user_id, &resources.database).await?;
        let (plan, client) = Self::visible_plan(&resources, &trainer, &plan_id).await?;
        if !trainer.coaches(&client) {
            return Err(AppError::permission_denied(
                "Only the client's current trainer can edit this plan",
            ));
        }

        let title = match request.title.as_deref() {
            Some(title) => required_text(title, "title")?,
            None => plan.title.clone(),
        };
        let description = match request.description.as_deref() {
            Some(description) => optional_text(Some(description), "description")?,
            None => plan.description.clone(),
        };
        ensure_unique_dates(&request.days, &plan.days)?;
        let new_days = build_days(&resources.database, trainer.id, plan.id, request.days).await?;

        resources
            .database
            .update_plan(plan.id, &title, description.as_deref(), &new_days)
            .await?;
        AppLogger::log_domain_event("plan", &plan.id.to_string(), "updated", &trainer.id.to_string());

        let updated = resources
            .database
            .get_plan(plan.id)
            .await?
            .ok_or_else(|| AppError::not_found("Plan"))?;
        Ok((StatusCode::OK, Json(updated)).into_response())
    }

    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(plan_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = super::authenticate(&headers, &resources).await?;
        let viewer = load_user(auth.user_id, &resources.database).await?;
        let (plan, client) = Self::visible_plan(&resources, &viewer, &plan_id).await?;

        if !viewer.coaches(&client) && !viewer.role.is_admin() {
            return Err(AppError::permission_denied(
                "Only the client's trainer or an admin can delete this plan",
            ));
        }

        resources.database.delete_plan(plan.id).await?;
        AppLogger::log_domain_event("plan", &plan.id.to_string(), "deleted", &viewer.id.to_string());
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    async fn handle_complete_day(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((plan_id, date)): Path<(String, String)>,
        Json(request): Json<CompleteDayRequest>,
    ) -> Result<Response, AppError> {
        let outcome = DayOutcome::Completed {
            photo: request.photo,
            note: request.note,
        };
        Self::record(&resources, &headers, &plan_id, &date, outcome).await
    }

    async fn handle_fail_day(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((plan_id, date)): Path<(String, String)>,
        request: OptionalJson<FailDayRequest>,
    ) -> Result<Response, AppError> {
        let request = request.unwrap_or_default();
        let outcome = DayOutcome::Failed {
            reason: request.reason,
            photo: request.photo,
        };
        Self::record(&resources, &headers, &plan_id, &date, outcome).await
    }

    async fn record(
        resources: &ServerResources,
        headers: &HeaderMap,
        plan_id: &str,
        date: &str,
        outcome: DayOutcome,
    ) -> Result<Response, AppError> {
        let auth = super::authenticate(headers, resources).await?;
        let client = require_client(auth.user_id, &resources.database).await?;
        let plan_id = super::parse_id(plan_id, "plan")?;
        let date = super::parse_date(date, "date")?;

        let recorded = record_day_outcome(
            resources,
            &client,
            plan_id,
            date,
            outcome,
            Utc::now().date_naive(),
        )
        .await?;
        Ok((StatusCode::OK, Json(recorded)).into_response())
    }

    async fn handle_progress(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(plan_id): Path<String>,
        Query(query): Query<ProgressQuery>,
    ) -> Result<Response, AppError> {
        let auth = super::authenticate(&headers, &resources).await?;
        let viewer = load_user(auth.user_id, &resources.database).await?;
        let (plan, _) = Self::visible_plan(&resources, &viewer, &plan_id).await?;

        let reference = match query.date.as_deref() {
            Some(date) => super::parse_date(date, "date")?,
            None => Utc::now().date_naive(),
        };
        let (week_start, week_end) = week_bounds(reference);
        let (month_start, month_end) = month_bounds(reference.year(), reference.month())?;
        let days = resources
            .database
            .day_statuses_for_plan(
                plan.id,
                week_start.min(month_start),
                week_end.max(month_end),
            )
            .await?;

        let summary = ProgressSummary::compute(reference, &days)?;
        Ok((StatusCode::OK, Json(summary)).into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day_request(date: &str) -> PlanDayRequest {
        PlanDayRequest {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            title: None,
            template_id: None,
            exercises: None,
        }
    }

    #[test]
    fn test_duplicate_dates_in_request_rejected() {
        let days = vec![day_request("2025-03-03"), day_request("2025-03-03")];
        let err = ensure_unique_dates(&days, &[]).unwrap_err();
        assert_eq!(err.code, crate::errors::ErrorCode::ResourceAlreadyExists);
    }

    #[test]
    fn test_dates_colliding_with_existing_days_rejected() {
        let existing = PlanDay {
            id: Uuid::new_v4(),
            plan_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
            title: None,
            template_id: None,
            exercises: vec![],
            status: DayStatus::Pending,
            log_id: None,
            status_changed_at: None,
        };
        assert!(ensure_unique_dates(&[day_request("2025-03-04")], &[existing.clone()]).is_err());
        assert!(ensure_unique_dates(&[day_request("2025-03-05")], &[existing]).is_ok());
    }

    #[test]
    fn test_fail_request_body_is_optional_fields() {
        let request: FailDayRequest = serde_json::from_str("{}").unwrap();
        assert!(request.reason.is_none());
        assert!(request.photo.is_none());
    }
}
