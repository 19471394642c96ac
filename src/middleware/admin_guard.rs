// ABOUTME: Role guards for route handlers (admin, approved trainer, client)
// ABOUTME: Each guard reloads the user and returns 403 when the role check fails
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! Role Authorization Guards
//!
//! Handlers authenticate first and then call one of these guards with the
//! authenticated user id. The guard returns the full [`User`] so handlers do
//! not need a second lookup.
//!
//! ```rust,no_run
//! use fitcoach_server::auth::AuthResult;
//! use fitcoach_server::database::Database;
//! use fitcoach_server::middleware::admin_guard::require_admin;
//!
//! async fn admin_handler(
//!     auth: AuthResult,
//!     database: &Database,
//! ) -> Result<String, fitcoach_server::errors::AppError> {
//!     let admin = require_admin(auth.user_id, database).await?;
//!     Ok(format!("Welcome admin: {}", admin.email))
//! }
//! ```

use uuid::Uuid;

use crate::database::Database;
use crate::errors::{AppError, AppResult};
use fitcoach_core::models::{TrainerStatus, User};
use fitcoach_core::permissions::UserRole;

/// Load the authenticated user
///
/// # Errors
///
/// Returns `AUTH_INVALID` if the account was deleted after the token was issued
pub async fn load_user(user_id: Uuid, database: &Database) -> AppResult<User> {
    database
        .get_user(user_id)
        .await?
        .ok_or_else(|| AppError::auth_invalid("Account no longer exists"))
}

/// Require admin privileges
///
/// # Errors
///
/// Returns `PERMISSION_DENIED` if the user is not an admin
pub async fn require_admin(user_id: Uuid, database: &Database) -> AppResult<User> {
    let user = load_user(user_id, database).await?;
    if !user.role.is_admin() {
        return Err(AppError::permission_denied("Admin privileges required"));
    }
    Ok(user)
}

/// Require one of the given roles
///
/// # Errors
///
/// Returns `PERMISSION_DENIED` if the user's role is not listed
pub async fn require_role(user_id: Uuid, database: &Database, roles: &[UserRole]) -> AppResult<User> {
    let user = load_user(user_id, database).await?;
    if !roles.contains(&user.role) {
        return Err(AppError::permission_denied(format!(
            "This action is not available to {} accounts",
            user.role
        )));
    }
    Ok(user)
}

/// Require a trainer whose application has been approved
///
/// # Errors
///
/// Returns `PERMISSION_DENIED` for non-trainers and for pending or rejected trainers
pub async fn require_approved_trainer(user_id: Uuid, database: &Database) -> AppResult<User> {
    let user = require_role(user_id, database, &[UserRole::Trainer]).await?;
    match user.trainer_status {
        TrainerStatus::Approved => Ok(user),
        TrainerStatus::Pending => Err(AppError::permission_denied(
            "Trainer application is awaiting admin approval",
        )),
        TrainerStatus::Rejected | TrainerStatus::None => Err(AppError::permission_denied(
            "Trainer application was not approved",
        )),
    }
}

/// Require a client account
///
/// # Errors
///
/// Returns `PERMISSION_DENIED` for trainers and admins
pub async fn require_client(user_id: Uuid, database: &Database) -> AppResult<User> {
    require_role(user_id, database, &[UserRole::Client]).await
}
