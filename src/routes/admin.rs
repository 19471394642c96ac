// ABOUTME: Admin moderation route handlers for accounts, trainer applications and platform stats
// ABOUTME: Every handler requires the admin role; admins cannot suspend or delete themselves
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! Admin routes
//!
//! - account listing with role and status filters
//! - trainer application review (approve or reject pending trainers)
//! - suspension, reactivation and deletion of accounts
//! - platform counters

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::UserFilter;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::middleware::require_admin;
use crate::resources::ServerResources;
use crate::routes::OptionalJson;
use crate::utils::validation::optional_text;
use fitcoach_core::models::{
    NewNotification, NotificationKind, TrainerStatus, User, UserProfile, UserStatus,
};
use fitcoach_core::permissions::UserRole;

/// Account listing filter
#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    /// Only this role
    pub role: Option<UserRole>,
    /// Only this status
    pub status: Option<UserStatus>,
}

/// Trainer application filter
#[derive(Debug, Default, Deserialize)]
pub struct ApplicationQuery {
    /// Application state, defaults to `pending`
    pub status: Option<TrainerStatus>,
}

/// Rejection body
#[derive(Debug, Default, Deserialize)]
pub struct RejectTrainerRequest {
    /// Reason shown to the trainer
    pub reason: Option<String>,
}

/// Admin routes
pub struct AdminRoutes;

impl AdminRoutes {
    /// Create all admin routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/admin/users", get(Self::handle_list_users))
            .route("/api/admin/users/:id", delete(Self::handle_delete_user))
            .route("/api/admin/users/:id/suspend", post(Self::handle_suspend))
            .route("/api/admin/users/:id/activate", post(Self::handle_activate))
            .route(
                "/api/admin/trainer-applications",
                get(Self::handle_list_applications),
            )
            .route(
                "/api/admin/trainers/:id/approve",
                post(Self::handle_approve_trainer),
            )
            .route(
                "/api/admin/trainers/:id/reject",
                post(Self::handle_reject_trainer),
            )
            .route("/api/admin/stats", get(Self::handle_stats))
            .with_state(resources)
    }

    async fn admin(headers: &HeaderMap, resources: &ServerResources) -> AppResult<User> {
        let auth = super::authenticate(headers, resources).await?;
        require_admin(auth.user_id, &resources.database).await
    }

    /// Load the target of a moderation action, refusing the acting admin
    async fn other_user(
        resources: &ServerResources,
        admin: &User,
        user_id: &str,
        action: &str,
    ) -> AppResult<User> {
        let user_id = super::parse_id(user_id, "user")?;
        if user_id == admin.id {
            return Err(AppError::invalid_input(format!(
                "Admins cannot {action} their own account"
            )));
        }
        resources
            .database
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))
    }

    async fn handle_list_users(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<UserListQuery>,
    ) -> Result<Response, AppError> {
        Self::admin(&headers, &resources).await?;
        let users: Vec<UserProfile> = resources
            .database
            .list_users(UserFilter {
                role: query.role,
                status: query.status,
            })
            .await?
            .iter()
            .map(UserProfile::from)
            .collect();
        Ok((StatusCode::OK, Json(users)).into_response())
    }

    async fn handle_list_applications(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ApplicationQuery>,
    ) -> Result<Response, AppError> {
        Self::admin(&headers, &resources).await?;
        let status = query.status.unwrap_or(TrainerStatus::Pending);
        let trainers: Vec<UserProfile> = resources
            .database
            .list_trainer_applications(status)
            .await?
            .iter()
            .map(UserProfile::from)
            .collect();
        Ok((StatusCode::OK, Json(trainers)).into_response())
    }

    /// Apply a decision to a pending trainer and return the updated account
    async fn decide(
        resources: &ServerResources,
        trainer_id: Uuid,
        decision: TrainerStatus,
        reason: Option<&str>,
    ) -> AppResult<User> {
        if !resources
            .database
            .decide_trainer_application(trainer_id, decision, reason)
            .await?
        {
            let trainer = resources
                .database
                .get_user(trainer_id)
                .await?
                .filter(|user| user.role == UserRole::Trainer)
                .ok_or_else(|| AppError::not_found("Trainer"))?;
            return Err(AppError::invalid_transition(format!(
                "Trainer application is already {}",
                trainer.trainer_status.as_str()
            )));
        }
        resources
            .database
            .get_user(trainer_id)
            .await?
            .ok_or_else(|| AppError::not_found("Trainer"))
    }

    async fn handle_approve_trainer(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(trainer_id): Path<String>,
    ) -> Result<Response, AppError> {
        let admin = Self::admin(&headers, &resources).await?;
        let trainer_id = super::parse_id(&trainer_id, "trainer")?;
        let trainer = Self::decide(&resources, trainer_id, TrainerStatus::Approved, None).await?;

        AppLogger::log_domain_event(
            "trainer_application",
            &trainer.id.to_string(),
            "approved",
            &admin.id.to_string(),
        );
        resources
            .notifier
            .notify(NewNotification::new(
                trainer.id,
                NotificationKind::TrainerApproved,
                "Application approved",
                "Your trainer application has been approved. You can now coach clients.",
            ))
            .await;

        Ok((StatusCode::OK, Json(UserProfile::from(&trainer))).into_response())
    }

    async fn handle_reject_trainer(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(trainer_id): Path<String>,
        OptionalJson(body): OptionalJson<RejectTrainerRequest>,
    ) -> Result<Response, AppError> {
        let admin = Self::admin(&headers, &resources).await?;
        let trainer_id = super::parse_id(&trainer_id, "trainer")?;
        let reason = body.and_then(|body| body.reason);
        let reason = optional_text(reason.as_deref(), "reason")?;
        let trainer = Self::decide(
            &resources,
            trainer_id,
            TrainerStatus::Rejected,
            reason.as_deref(),
        )
        .await?;

        AppLogger::log_domain_event(
            "trainer_application",
            &trainer.id.to_string(),
            "rejected",
            &admin.id.to_string(),
        );
        let message = reason.map_or_else(
            || "Your trainer application has been rejected.".to_owned(),
            |reason| format!("Your trainer application has been rejected: {reason}"),
        );
        resources
            .notifier
            .notify(NewNotification::new(
                trainer.id,
                NotificationKind::TrainerRejected,
                "Application rejected",
                message,
            ))
            .await;

        Ok((StatusCode::OK, Json(UserProfile::from(&trainer))).into_response())
    }

    async fn handle_suspend(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(user_id): Path<String>,
    ) -> Result<Response, AppError> {
        let admin = Self::admin(&headers, &resources).await?;
        let mut user = Self::other_user(&resources, &admin, &user_id, "suspend").await?;

        resources
            .database
            .set_user_status(user.id, UserStatus::Suspended)
            .await?;
        user.status = UserStatus::Suspended;

        AppLogger::log_security_event(
            "account_suspended",
            "medium",
            &format!("Account {} suspended by admin {}", user.id, admin.id),
            Some(&user.id.to_string()),
        );
        resources
            .notifier
            .notify(NewNotification::new(
                user.id,
                NotificationKind::AccountSuspended,
                "Account suspended",
                "Your account has been suspended by an administrator.",
            ))
            .await;

        Ok((StatusCode::OK, Json(UserProfile::from(&user))).into_response())
    }

    async fn handle_activate(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(user_id): Path<String>,
    ) -> Result<Response, AppError> {
        let admin = Self::admin(&headers, &resources).await?;
        let mut user = Self::other_user(&resources, &admin, &user_id, "activate").await?;

        resources
            .database
            .set_user_status(user.id, UserStatus::Active)
            .await?;
        user.status = UserStatus::Active;
        AppLogger::log_domain_event("user", &user.id.to_string(), "activated", &admin.id.to_string());

        Ok((StatusCode::OK, Json(UserProfile::from(&user))).into_response())
    }

    async fn handle_delete_user(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(user_id): Path<String>,
    ) -> Result<Response, AppError> {
        let admin = Self::admin(&headers, &resources).await?;
        let user = Self::other_user(&resources, &admin, &user_id, "delete").await?;

        resources.database.delete_user(user.id).await?;
        AppLogger::log_security_event(
            "account_deleted",
            "medium",
            &format!("Account {} ({}) deleted by admin {}", user.id, user.role, admin.id),
            Some(&user.id.to_string()),
        );

        Ok(StatusCode::NO_CONTENT.into_response())
    }

    async fn handle_stats(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        Self::admin(&headers, &resources).await?;
        let stats = resources.database.admin_stats().await?;
        Ok((StatusCode::OK, Json(stats)).into_response())
    }
}
