// ABOUTME: User profile route handlers for reading and updating profiles
// ABOUTME: Enforces that profiles are visible only to the user, their trainer or clients, and admins
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;

use crate::errors::{AppError, AppResult};
use crate::middleware::load_user;
use crate::resources::ServerResources;
use crate::services::access::can_view_profile;
use crate::utils::photo::validate_photo;
use crate::utils::validation::{optional_text, required_text};
use fitcoach_core::models::{ProfileDetails, UserProfile};
use fitcoach_core::permissions::UserRole;

/// Partial profile update. Absent fields keep their value, blank text clears it.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub goal: Option<String>,
    pub bio: Option<String>,
    pub specialization: Option<String>,
    pub experience_years: Option<u32>,
    pub certifications: Option<String>,
    /// Base64 image; an empty string removes the photo
    pub profile_photo: Option<String>,
}

impl UpdateProfileRequest {
    /// Apply the update on top of the current profile
    fn apply(
        self,
        current: &ProfileDetails,
        role: UserRole,
        max_photo_bytes: usize,
    ) -> AppResult<ProfileDetails> {
        let mut profile = current.clone();

        if let Some(age) = self.age {
            if !(10..=120).contains(&age) {
                return Err(AppError::invalid_input("Age must be between 10 and 120"));
            }
            profile.age = Some(age);
        }
        if let Some(height) = self.height_cm {
            ensure_positive(height, "height_cm")?;
            profile.height_cm = Some(height);
        }
        if let Some(weight) = self.weight_kg {
            ensure_positive(weight, "weight_kg")?;
            profile.weight_kg = Some(weight);
        }
        if let Some(gender) = self.gender {
            profile.gender = optional_text(Some(&gender), "gender")?;
        }
        if let Some(goal) = self.goal {
            profile.goal = optional_text(Some(&goal), "goal")?;
        }
        if let Some(bio) = self.bio {
            profile.bio = optional_text(Some(&bio), "bio")?;
        }

        let trainer_fields = self.specialization.is_some()
            || self.experience_years.is_some()
            || self.certifications.is_some();
        if trainer_fields && role != UserRole::Trainer {
            return Err(AppError::invalid_input(
                "Specialization, experience and certifications apply to trainers only",
            ));
        }
        if let Some(specialization) = self.specialization {
            profile.specialization = optional_text(Some(&specialization), "specialization")?;
        }
        if let Some(years) = self.experience_years {
            profile.experience_years = Some(years);
        }
        if let Some(certifications) = self.certifications {
            profile.certifications = optional_text(Some(&certifications), "certifications")?;
        }

        if let Some(photo) = self.profile_photo {
            if photo.trim().is_empty() {
                profile.profile_photo = None;
            } else {
                validate_photo(&photo, max_photo_bytes)?;
                profile.profile_photo = Some(photo.trim().to_owned());
            }
        }

        Ok(profile)
    }
}

fn ensure_positive(value: f64, field: &str) -> AppResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(AppError::invalid_input(format!(
            "Field '{field}' must be a positive number"
        )))
    }
}

/// User profile routes
pub struct UserRoutes;

impl UserRoutes {
    /// Create all user profile routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/users/me", put(Self::handle_update_me))
            .route("/api/users/:id", get(Self::handle_get_user))
            .with_state(resources)
    }

    async fn handle_update_me(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<UpdateProfileRequest>,
    ) -> Result<Response, AppError> {
        let auth = super::authenticate(&headers, &resources).await?;
        let mut user = load_user(auth.user_id, &resources.database).await?;

        let name = match request.name.as_deref() {
            Some(name) => required_text(name, "name")?,
            None => user.name.clone(),
        };
        let profile = request.apply(
            &user.profile,
            user.role,
            resources.config.limits.max_photo_bytes,
        )?;

        resources
            .database
            .update_user_profile(user.id, &name, &profile)
            .await?;
        user.name = name;
        user.profile = profile;

        Ok((StatusCode::OK, Json(UserProfile::from(&user))).into_response())
    }

    async fn handle_get_user(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(user_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = super::authenticate(&headers, &resources).await?;
        let user_id = super::parse_id(&user_id, "user")?;
        let viewer = load_user(auth.user_id, &resources.database).await?;

        let target = resources
            .database
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;
        if !can_view_profile(&viewer, &target) {
            return Err(AppError::permission_denied(
                "You do not have access to this profile",
            ));
        }

        Ok((StatusCode::OK, Json(UserProfile::from(&target))).into_response())
    }
}
