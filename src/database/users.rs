// ABOUTME: User management database operations
// ABOUTME: Handles registration, profiles, trainer applications, assignments and account status
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{from_json_column, parse_optional_uuid, parse_uuid, to_json_column, Database};
use crate::errors::{AppError, AppResult};
use fitcoach_core::models::{ProfileDetails, TrainerStatus, User, UserStatus};
use fitcoach_core::permissions::UserRole;

const USER_COLUMNS: &str = "id, email, password_hash, name, role, status, trainer_status, \
     rejection_reason, trainer_id, profile, created_at, updated_at";

/// Optional filters for the admin user list
#[derive(Debug, Clone, Copy, Default)]
pub struct UserFilter {
    /// Only this role
    pub role: Option<UserRole>,
    /// Only this account status
    pub status: Option<UserStatus>,
}

impl Database {
    /// Create users table
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails
    pub(super) async fn migrate_users(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                name TEXT NOT NULL,
                role TEXT NOT NULL CHECK (role IN ('client', 'trainer', 'admin')),
                status TEXT NOT NULL DEFAULT 'active' CHECK (status IN ('active', 'suspended')),
                trainer_status TEXT NOT NULL DEFAULT 'none'
                    CHECK (trainer_status IN ('none', 'pending', 'approved', 'rejected')),
                rejection_reason TEXT,
                trainer_id TEXT REFERENCES users(id) ON DELETE SET NULL,
                profile TEXT NOT NULL DEFAULT '{}',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_role ON users(role, trainer_status)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_trainer_id ON users(trainer_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Insert a new user
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_ALREADY_EXISTS` if the email is taken
    pub async fn create_user(&self, user: &User) -> AppResult<()> {
        let result = sqlx::query(
            r"
            INSERT INTO users (id, email, password_hash, name, role, status, trainer_status,
                               rejection_reason, trainer_id, profile, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(user.role.as_str())
        .bind(user.status.as_str())
        .bind(user.trainer_status.as_str())
        .bind(&user.rejection_reason)
        .bind(user.trainer_id.map(|id| id.to_string()))
        .bind(to_json_column(&user.profile)?)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(
                AppError::already_exists(format!("Email {} is already registered", user.email)),
            ),
            Err(e) => Err(e.into()),
        }
    }

    /// Get a user by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_user(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_user).transpose()
    }

    /// Get a user by (case-insensitive) email
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_user).transpose()
    }

    /// Replace the display name and profile fields
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` if the user does not exist
    pub async fn update_user_profile(
        &self,
        user_id: Uuid,
        name: &str,
        profile: &ProfileDetails,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE users SET name = $2, profile = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(user_id.to_string())
        .bind(name)
        .bind(to_json_column(profile)?)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("User"));
        }
        Ok(())
    }

    /// Store a new password hash
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` if the user does not exist
    pub async fn update_password(&self, user_id: Uuid, password_hash: &str) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = $3 WHERE id = $1")
                .bind(user_id.to_string())
                .bind(password_hash)
                .bind(Utc::now())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("User"));
        }
        Ok(())
    }

    /// List users, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_users(&self, filter: UserFilter) -> AppResult<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE ($1 IS NULL OR role = $1) AND ($2 IS NULL OR status = $2)
             ORDER BY created_at DESC"
        ))
        .bind(filter.role.map(UserRole::as_str))
        .bind(filter.status.map(UserStatus::as_str))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_user).collect()
    }

    /// Approved, active trainers with the number of clients assigned to each
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_trainers_with_client_counts(&self) -> AppResult<Vec<(User, i64)>> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS},
                    (SELECT COUNT(*) FROM users c WHERE c.trainer_id = users.id) AS client_count
             FROM users
             WHERE role = 'trainer' AND trainer_status = 'approved' AND status = 'active'
             ORDER BY name ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Ok((row_to_user(row)?, row.try_get::<i64, _>("client_count")?)))
            .collect()
    }

    /// Number of clients currently assigned to a trainer
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn count_clients(&self, trainer_id: Uuid) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE trainer_id = $1")
            .bind(trainer_id.to_string())
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Clients currently assigned to a trainer
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_clients(&self, trainer_id: Uuid) -> AppResult<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE trainer_id = $1 ORDER BY name ASC"
        ))
        .bind(trainer_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_user).collect()
    }

    /// Trainer accounts in a given application state, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_trainer_applications(&self, status: TrainerStatus) -> AppResult<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE role = 'trainer' AND trainer_status = $1
             ORDER BY created_at ASC"
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_user).collect()
    }

    /// Decide a pending trainer application.
    ///
    /// Returns `false` when the user is not a trainer with a pending application.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn decide_trainer_application(
        &self,
        trainer_id: Uuid,
        decision: TrainerStatus,
        reason: Option<&str>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE users SET trainer_status = $2, rejection_reason = $3, updated_at = $4
            WHERE id = $1 AND role = 'trainer' AND trainer_status = 'pending'
            ",
        )
        .bind(trainer_id.to_string())
        .bind(decision.as_str())
        .bind(reason)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Set the account status
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` if the user does not exist
    pub async fn set_user_status(&self, user_id: Uuid, status: UserStatus) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(user_id.to_string())
            .bind(status.as_str())
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("User"));
        }
        Ok(())
    }

    /// Assign a trainer to a client that has none.
    ///
    /// Returns `false` when the client already has a trainer.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn assign_trainer_if_unassigned(
        &self,
        client_id: Uuid,
        trainer_id: Uuid,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE users SET trainer_id = $2, updated_at = $3
            WHERE id = $1 AND role = 'client' AND trainer_id IS NULL
            ",
        )
        .bind(client_id.to_string())
        .bind(trainer_id.to_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Turn an existing account into an active admin with new credentials.
    ///
    /// Clients coached by the account become unassigned.
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` if the user does not exist
    pub async fn promote_to_admin(
        &self,
        user_id: Uuid,
        name: &str,
        password_hash: &str,
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            r"
            UPDATE users
            SET role = 'admin', status = 'active', trainer_status = 'none', trainer_id = NULL,
                name = $2, password_hash = $3, updated_at = $4
            WHERE id = $1
            ",
        )
        .bind(user_id.to_string())
        .bind(name)
        .bind(password_hash)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("User"));
        }

        sqlx::query("UPDATE users SET trainer_id = NULL WHERE trainer_id = $1")
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Delete a user. Assigned clients of a deleted trainer become unassigned.
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` if the user does not exist
    pub async fn delete_user(&self, user_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("User"));
        }
        Ok(())
    }
}

fn row_to_user(row: &SqliteRow) -> AppResult<User> {
    Ok(User {
        id: parse_uuid(&row.try_get::<String, _>("id")?)?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        name: row.try_get("name")?,
        role: row.try_get::<String, _>("role")?.parse()?,
        status: row.try_get::<String, _>("status")?.parse()?,
        trainer_status: row.try_get::<String, _>("trainer_status")?.parse()?,
        rejection_reason: row.try_get("rejection_reason")?,
        trainer_id: parse_optional_uuid(row.try_get("trainer_id")?)?,
        profile: from_json_column(&row.try_get::<String, _>("profile")?)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
