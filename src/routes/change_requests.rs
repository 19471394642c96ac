// ABOUTME: Trainer change request route handlers for clients and the admin review queue
// ABOUTME: Clients submit or cancel one pending request; admins approve (reassigning) or reject it
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! Change-trainer requests
//!
//! A client that already has a trainer asks an admin to move them to
//! another approved trainer. Approval reassigns the client in the same
//! transaction and notifies all three parties.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::ChangeRequestFilter;
use crate::errors::AppError;
use crate::logging::AppLogger;
use crate::middleware::{require_admin, require_client, require_role};
use crate::resources::ServerResources;
use crate::routes::OptionalJson;
use crate::utils::validation::{optional_text, required_text};
use fitcoach_core::models::{
    ChangeTrainerRequest, NewNotification, NotificationKind, RequestStatus,
};
use fitcoach_core::permissions::UserRole;

/// New change request
#[derive(Debug, Deserialize)]
pub struct CreateChangeRequest {
    /// Trainer the client wants to move to
    pub requested_trainer_id: Uuid,
    /// Why the client wants to change
    #[serde(default)]
    pub reason: String,
}

/// Listing filter
#[derive(Debug, Default, Deserialize)]
pub struct ChangeRequestQuery {
    /// Only requests in this state
    pub status: Option<RequestStatus>,
}

/// Admin decision body
#[derive(Debug, Default, Deserialize)]
pub struct DecisionRequest {
    /// Note shown to the client
    pub note: Option<String>,
}

/// Change request routes
pub struct ChangeRequestRoutes;

impl ChangeRequestRoutes {
    /// Create client and admin change request routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/change-requests",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route("/api/change-requests/:id", delete(Self::handle_cancel))
            .route(
                "/api/admin/change-requests/:id/approve",
                post(Self::handle_approve),
            )
            .route(
                "/api/admin/change-requests/:id/reject",
                post(Self::handle_reject),
            )
            .with_state(resources)
    }

    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<CreateChangeRequest>,
    ) -> Result<Response, AppError> {
        let auth = super::authenticate(&headers, &resources).await?;
        let client = require_client(auth.user_id, &resources.database).await?;

        let Some(current_trainer_id) = client.trainer_id else {
            return Err(AppError::invalid_input(
                "You have no trainer yet; select one instead",
            ));
        };
        if request.requested_trainer_id == current_trainer_id {
            return Err(AppError::invalid_input(
                "The requested trainer is already your trainer",
            ));
        }
        let reason = required_text(&request.reason, "reason")?;

        resources
            .database
            .get_user(request.requested_trainer_id)
            .await?
            .filter(|user| user.is_approved_trainer() && user.status.can_login())
            .ok_or_else(|| AppError::not_found("Trainer"))?;

        let change_request = ChangeTrainerRequest {
            id: Uuid::new_v4(),
            client_id: client.id,
            current_trainer_id: Some(current_trainer_id),
            requested_trainer_id: request.requested_trainer_id,
            reason,
            status: RequestStatus::Pending,
            admin_note: None,
            reviewed_by: None,
            reviewed_at: None,
            created_at: Utc::now(),
        };
        resources
            .database
            .create_change_request(&change_request)
            .await?;
        AppLogger::log_domain_event(
            "change_request",
            &change_request.id.to_string(),
            "submitted",
            &client.id.to_string(),
        );

        Ok((StatusCode::CREATED, Json(change_request)).into_response())
    }

    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ChangeRequestQuery>,
    ) -> Result<Response, AppError> {
        let auth = super::authenticate(&headers, &resources).await?;
        let viewer = require_role(
            auth.user_id,
            &resources.database,
            &[UserRole::Client, UserRole::Admin],
        )
        .await?;

        let filter = ChangeRequestFilter {
            client_id: (!viewer.role.is_admin()).then_some(viewer.id),
            status: query.status,
        };
        let requests = resources.database.list_change_requests(filter).await?;
        Ok((StatusCode::OK, Json(requests)).into_response())
    }

    async fn handle_cancel(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(request_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = super::authenticate(&headers, &resources).await?;
        let client = require_client(auth.user_id, &resources.database).await?;
        let request_id = super::parse_id(&request_id, "change request")?;

        resources
            .database
            .cancel_change_request(request_id, client.id)
            .await?;
        AppLogger::log_domain_event(
            "change_request",
            &request_id.to_string(),
            "cancelled",
            &client.id.to_string(),
        );
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    async fn handle_approve(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(request_id): Path<String>,
        OptionalJson(body): OptionalJson<DecisionRequest>,
    ) -> Result<Response, AppError> {
        let auth = super::authenticate(&headers, &resources).await?;
        let admin = require_admin(auth.user_id, &resources.database).await?;
        let request_id = super::parse_id(&request_id, "change request")?;
        let note = body.and_then(|body| body.note);
        let note = optional_text(note.as_deref(), "note")?;

        let pending = resources
            .database
            .get_change_request(request_id)
            .await?
            .ok_or_else(|| AppError::not_found("Change request"))?;
        pending.status.ensure_pending()?;

        let new_trainer = resources
            .database
            .get_user(pending.requested_trainer_id)
            .await?
            .filter(|user| user.is_approved_trainer() && user.status.can_login())
            .ok_or_else(|| AppError::invalid_input("The requested trainer is no longer available"))?;

        let decided = resources
            .database
            .approve_change_request(request_id, admin.id, note.as_deref())
            .await?;
        AppLogger::log_domain_event(
            "change_request",
            &decided.id.to_string(),
            "approved",
            &admin.id.to_string(),
        );

        let client_name = resources
            .database
            .get_user(decided.client_id)
            .await?
            .map_or_else(|| "A client".to_owned(), |client| client.name);

        let mut notifications = vec![
            NewNotification::new(
                decided.client_id,
                NotificationKind::ChangeRequestApproved,
                "Trainer change approved",
                format!("You are now coached by {}", new_trainer.name),
            )
            .related_to(decided.id),
            NewNotification::new(
                new_trainer.id,
                NotificationKind::NewClient,
                "New client",
                format!("{client_name} has been assigned to you"),
            )
            .related_to(decided.client_id),
        ];
        if let Some(old_trainer_id) = decided.current_trainer_id {
            notifications.push(
                NewNotification::new(
                    old_trainer_id,
                    NotificationKind::TrainerReassigned,
                    "Client reassigned",
                    format!("{client_name} has moved to another trainer"),
                )
                .related_to(decided.client_id),
            );
        }
        resources.notifier.notify_all(notifications).await;

        Ok((StatusCode::OK, Json(decided)).into_response())
    }

    async fn handle_reject(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(request_id): Path<String>,
        OptionalJson(body): OptionalJson<DecisionRequest>,
    ) -> Result<Response, AppError> {
        let auth = super::authenticate(&headers, &resources).await?;
        let admin = require_admin(auth.user_id, &resources.database).await?;
        let request_id = super::parse_id(&request_id, "change request")?;
        let note = body.and_then(|body| body.note);
        let note = optional_text(note.as_deref(), "note")?;

        let decided = resources
            .database
            .reject_change_request(request_id, admin.id, note.as_deref())
            .await?;
        AppLogger::log_domain_event(
            "change_request",
            &decided.id.to_string(),
            "rejected",
            &admin.id.to_string(),
        );

        let message = match decided.admin_note.as_deref() {
            Some(note) => format!("Your trainer change request was declined: {note}"),
            None => "Your trainer change request was declined".to_owned(),
        };
        resources
            .notifier
            .notify(
                NewNotification::new(
                    decided.client_id,
                    NotificationKind::ChangeRequestRejected,
                    "Trainer change declined",
                    message,
                )
                .related_to(decided.id),
            )
            .await;

        Ok((StatusCode::OK, Json(decided)).into_response())
    }
}
