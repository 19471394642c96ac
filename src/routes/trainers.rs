// ABOUTME: Trainer directory and client-trainer matching route handlers
// ABOUTME: Lists approved trainers, lets an unassigned client pick one, and lists a trainer's clients
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::logging::AppLogger;
use crate::middleware::{require_approved_trainer, require_client};
use crate::resources::ServerResources;
use fitcoach_core::models::{NewNotification, NotificationKind, TrainerSummary, UserProfile};

/// Client picks a trainer
#[derive(Debug, Deserialize)]
pub struct SelectTrainerRequest {
    /// Approved trainer to work with
    pub trainer_id: Uuid,
}

/// Trainer directory routes
pub struct TrainerRoutes;

impl TrainerRoutes {
    /// Create all trainer routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/trainers", get(Self::handle_list_trainers))
            .route("/api/trainers/select", post(Self::handle_select_trainer))
            .route("/api/trainers/me/clients", get(Self::handle_my_clients))
            .route("/api/trainers/:id", get(Self::handle_get_trainer))
            .with_state(resources)
    }

    async fn handle_list_trainers(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let trainers: Vec<TrainerSummary> = resources
            .database
            .list_trainers_with_client_counts()
            .await?
            .into_iter()
            .map(|(user, client_count)| TrainerSummary {
                profile: UserProfile::from(&user),
                client_count,
            })
            .collect();
        Ok((StatusCode::OK, Json(trainers)).into_response())
    }

    async fn handle_get_trainer(
        State(resources): State<Arc<ServerResources>>,
        Path(trainer_id): Path<String>,
    ) -> Result<Response, AppError> {
        let trainer_id = super::parse_id(&trainer_id, "trainer")?;
        let trainer = resources
            .database
            .get_user(trainer_id)
            .await?
            .filter(|user| user.is_approved_trainer() && user.status.can_login())
            .ok_or_else(|| AppError::not_found("Trainer"))?;
        let client_count = resources.database.count_clients(trainer.id).await?;

        Ok((
            StatusCode::OK,
            Json(TrainerSummary {
                profile: UserProfile::from(&trainer),
                client_count,
            }),
        )
            .into_response())
    }

    async fn handle_select_trainer(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<SelectTrainerRequest>,
    ) -> Result<Response, AppError> {
        let auth = super::authenticate(&headers, &resources).await?;
        let mut client = require_client(auth.user_id, &resources.database).await?;

        if client.trainer_id.is_some() {
            return Err(AppError::already_exists(
                "You already have a trainer; submit a change request instead",
            ));
        }

        let trainer = resources
            .database
            .get_user(request.trainer_id)
            .await?
            .filter(|user| user.is_approved_trainer() && user.status.can_login())
            .ok_or_else(|| AppError::not_found("Trainer"))?;

        if !resources
            .database
            .assign_trainer_if_unassigned(client.id, trainer.id)
            .await?
        {
            return Err(AppError::already_exists(
                "You already have a trainer; submit a change request instead",
            ));
        }
        client.trainer_id = Some(trainer.id);

        AppLogger::log_domain_event(
            "user",
            &client.id.to_string(),
            "trainer_selected",
            &client.id.to_string(),
        );
        resources
            .notifier
            .notify(
                NewNotification::new(
                    trainer.id,
                    NotificationKind::TrainerSelected,
                    "New client",
                    format!("{} selected you as their trainer", client.name),
                )
                .related_to(client.id),
            )
            .await;

        Ok((StatusCode::OK, Json(UserProfile::from(&client))).into_response())
    }

    async fn handle_my_clients(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = super::authenticate(&headers, &resources).await?;
        let trainer = require_approved_trainer(auth.user_id, &resources.database).await?;

        let clients: Vec<UserProfile> = resources
            .database
            .list_clients(trainer.id)
            .await?
            .iter()
            .map(UserProfile::from)
            .collect();
        Ok((StatusCode::OK, Json(clients)).into_response())
    }
}
