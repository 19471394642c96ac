// ABOUTME: Visibility rules for client data shared by plans, logs, calendar and profiles
// ABOUTME: A client's data is visible to the client, their current trainer and admins
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use uuid::Uuid;

use crate::database::Database;
use crate::errors::{AppError, AppResult, ErrorCode};
use fitcoach_core::models::{User, WorkoutPlan};
use fitcoach_core::permissions::UserRole;

/// Whether `viewer` may read the client's plans, logs and progress
#[must_use]
pub fn can_view_client(viewer: &User, client: &User) -> bool {
    viewer.id == client.id || viewer.role.is_admin() || viewer.coaches(client)
}

/// Whether `viewer` may read a user's profile
#[must_use]
pub fn can_view_profile(viewer: &User, target: &User) -> bool {
    can_view_client(viewer, target) || viewer.trainer_id == Some(target.id)
}

/// Load the client that owns some data and check `viewer` may read it.
///
/// Access follows the client's current assignment, so a plan or log written
/// under a previous trainer moves with the client.
///
/// # Errors
///
/// - `RESOURCE_NOT_FOUND` when the client no longer exists
/// - `PERMISSION_DENIED` when the viewer may not see that client
pub async fn client_for_viewer(
    viewer: &User,
    client_id: Uuid,
    database: &Database,
) -> AppResult<User> {
    if viewer.id == client_id {
        return Ok(viewer.clone());
    }
    let client = database
        .get_user(client_id)
        .await?
        .ok_or_else(|| AppError::not_found("Client"))?;
    if !can_view_client(viewer, &client) {
        return Err(AppError::permission_denied(
            "You do not have access to this client's data",
        ));
    }
    Ok(client)
}

/// Check `viewer` may read `plan`, returning the plan's client
///
/// # Errors
///
/// `PERMISSION_DENIED` unless the viewer is the client, their current trainer or an admin
pub async fn ensure_can_view_plan(
    viewer: &User,
    plan: &WorkoutPlan,
    database: &Database,
) -> AppResult<User> {
    client_for_viewer(viewer, plan.client_id, database)
        .await
        .map_err(|e| match e.code {
            ErrorCode::PermissionDenied => {
                AppError::permission_denied("You do not have access to this plan")
            }
            _ => e,
        })
}

/// Resolve whose calendar or progress is being asked for.
///
/// Clients may omit `client_id` (or pass their own). Trainers and admins
/// must name a client they can see.
///
/// # Errors
///
/// - `MISSING_REQUIRED_FIELD` when a trainer or admin omits `client_id`
/// - `RESOURCE_NOT_FOUND` when the id is not a client
/// - `PERMISSION_DENIED` when the viewer may not see that client
pub async fn resolve_client_scope(
    viewer: &User,
    requested: Option<Uuid>,
    database: &Database,
) -> AppResult<User> {
    let client_id = match (requested, viewer.role) {
        (Some(id), _) => id,
        (None, UserRole::Client) => return Ok(viewer.clone()),
        (None, _) => return Err(AppError::missing_field("client_id")),
    };

    if client_id == viewer.id && viewer.role == UserRole::Client {
        return Ok(viewer.clone());
    }

    let client = database
        .get_user(client_id)
        .await?
        .filter(|user| user.role == UserRole::Client)
        .ok_or_else(|| AppError::not_found("Client"))?;

    if !can_view_client(viewer, &client) {
        return Err(AppError::permission_denied(
            "You do not have access to this client's data",
        ));
    }
    Ok(client)
}
