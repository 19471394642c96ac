// ABOUTME: Workout template route handlers for approved trainers
// ABOUTME: Create, list, read, update and delete templates scoped to the authoring trainer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::middleware::require_approved_trainer;
use crate::resources::ServerResources;
use crate::utils::validation::{optional_text, required_text};
use fitcoach_core::models::{Exercise, User, WorkoutTemplate};

/// Body for creating or replacing a template
#[derive(Debug, Deserialize)]
pub struct TemplateRequest {
    /// Template name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Exercises, at least one
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

impl TemplateRequest {
    /// Validate and normalize into `(name, description, exercises)`
    fn into_parts(self) -> AppResult<(String, Option<String>, Vec<Exercise>)> {
        let name = required_text(&self.name, "name")?;
        let description = optional_text(self.description.as_deref(), "description")?;
        Exercise::validate_all(&self.exercises)?;
        let exercises = self
            .exercises
            .into_iter()
            .map(|exercise| Exercise {
                name: exercise.name.trim().to_owned(),
                notes: exercise
                    .notes
                    .map(|n| n.trim().to_owned())
                    .filter(|n| !n.is_empty()),
                ..exercise
            })
            .collect();
        Ok((name, description, exercises))
    }
}

/// Workout template routes
pub struct TemplateRoutes;

impl TemplateRoutes {
    /// Create all template routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/templates",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                "/api/templates/:id",
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .with_state(resources)
    }

    async fn trainer(headers: &HeaderMap, resources: &ServerResources) -> AppResult<User> {
        let auth = super::authenticate(headers, resources).await?;
        require_approved_trainer(auth.user_id, &resources.database).await
    }

    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<TemplateRequest>,
    ) -> Result<Response, AppError> {
        let trainer = Self::trainer(&headers, &resources).await?;
        let (name, description, exercises) = request.into_parts()?;

        let now = Utc::now();
        let template = WorkoutTemplate {
            id: Uuid::new_v4(),
            trainer_id: trainer.id,
            name,
            description,
            exercises,
            created_at: now,
            updated_at: now,
        };
        resources.database.create_template(&template).await?;
        tracing::info!(template_id = %template.id, trainer_id = %trainer.id, "Workout template created");

        Ok((StatusCode::CREATED, Json(template)).into_response())
    }

    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let trainer = Self::trainer(&headers, &resources).await?;
        let templates = resources.database.list_templates(trainer.id).await?;
        Ok((StatusCode::OK, Json(templates)).into_response())
    }

    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(template_id): Path<String>,
    ) -> Result<Response, AppError> {
        let trainer = Self::trainer(&headers, &resources).await?;
        let template_id = super::parse_id(&template_id, "template")?;
        let template = resources
            .database
            .get_template(template_id, trainer.id)
            .await?
            .ok_or_else(|| AppError::not_found("Template"))?;
        Ok((StatusCode::OK, Json(template)).into_response())
    }

    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(template_id): Path<String>,
        Json(request): Json<TemplateRequest>,
    ) -> Result<Response, AppError> {
        let trainer = Self::trainer(&headers, &resources).await?;
        let template_id = super::parse_id(&template_id, "template")?;
        let mut template = resources
            .database
            .get_template(template_id, trainer.id)
            .await?
            .ok_or_else(|| AppError::not_found("Template"))?;

        let (name, description, exercises) = request.into_parts()?;
        template.name = name;
        template.description = description;
        template.exercises = exercises;
        template.updated_at = Utc::now();
        resources.database.update_template(&template).await?;

        Ok((StatusCode::OK, Json(template)).into_response())
    }

    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(template_id): Path<String>,
    ) -> Result<Response, AppError> {
        let trainer = Self::trainer(&headers, &resources).await?;
        let template_id = super::parse_id(&template_id, "template")?;
        resources
            .database
            .delete_template(template_id, trainer.id)
            .await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(name: &str, sets: u32) -> Exercise {
        Exercise {
            name: name.to_owned(),
            sets,
            reps: 10,
            rest_seconds: Some(60),
            notes: Some("  ".to_owned()),
        }
    }

    #[test]
    fn test_template_request_normalizes_fields() {
        let request = TemplateRequest {
            name: "  Push day ".into(),
            description: Some(String::new()),
            exercises: vec![exercise(" Bench press ", 3)],
        };
        let (name, description, exercises) = request.into_parts().unwrap();
        assert_eq!(name, "Push day");
        assert!(description.is_none());
        assert_eq!(exercises[0].name, "Bench press");
        assert!(exercises[0].notes.is_none());
    }

    #[test]
    fn test_template_request_requires_exercises() {
        let request = TemplateRequest {
            name: "Empty".into(),
            description: None,
            exercises: vec![],
        };
        assert!(request.into_parts().is_err());

        let request = TemplateRequest {
            name: "Zero sets".into(),
            description: None,
            exercises: vec![exercise("Squat", 0)],
        };
        assert!(request.into_parts().is_err());
    }
}
