// ABOUTME: Password reset token storage keyed by the SHA-256 hash of the emailed token
// ABOUTME: Tokens are single use and consumed in the same transaction that changes the password
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{parse_uuid, Database};
use crate::errors::{AppError, AppResult};

impl Database {
    /// Create password reset tokens table
    ///
    /// # Errors
    ///
    /// Returns an error if table creation fails
    pub(super) async fn migrate_password_resets(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS password_reset_tokens (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                token_hash TEXT UNIQUE NOT NULL,
                expires_at INTEGER NOT NULL,
                used_at INTEGER,
                created_at INTEGER NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Store the hash of a freshly issued reset token
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn store_password_reset_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO password_reset_tokens (id, user_id, token_hash, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id.to_string())
        .bind(token_hash)
        .bind(expires_at.timestamp())
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Consume a reset token and set the new password hash.
    ///
    /// The token must be unused and unexpired. The user's other outstanding
    /// tokens are invalidated. Returns the user id whose password changed.
    ///
    /// # Errors
    ///
    /// Returns `AUTH_INVALID` when the token is unknown, used or expired
    pub async fn reset_password_with_token(
        &self,
        token_hash: &str,
        password_hash: &str,
    ) -> AppResult<Uuid> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let user_id: Option<String> = sqlx::query_scalar(
            r"
            UPDATE password_reset_tokens SET used_at = $2
            WHERE token_hash = $1 AND used_at IS NULL AND expires_at > $2
            RETURNING user_id
            ",
        )
        .bind(token_hash)
        .bind(now.timestamp())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(user_id) = user_id else {
            return Err(AppError::auth_invalid("Reset token is invalid or has expired"));
        };

        sqlx::query("UPDATE users SET password_hash = $2, updated_at = $3 WHERE id = $1")
            .bind(&user_id)
            .bind(password_hash)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE password_reset_tokens SET used_at = $2 WHERE user_id = $1 AND used_at IS NULL",
        )
        .bind(&user_id)
        .bind(now.timestamp())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        parse_uuid(&user_id)
    }
}
