// ABOUTME: Owner-scoped notification storage with read flags and unread counts
// ABOUTME: Every query filters on the recipient so users only touch their own rows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{parse_optional_uuid, parse_uuid, Database};
use crate::errors::{AppError, AppResult};
use fitcoach_core::models::{NewNotification, Notification};

impl Database {
    /// Create notifications table
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails
    pub(super) async fn migrate_notifications(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS notifications (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                kind TEXT NOT NULL,
                title TEXT NOT NULL,
                message TEXT NOT NULL,
                related_id TEXT,
                is_read INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications(user_id, is_read)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Store a notification
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_notification(&self, input: &NewNotification) -> AppResult<Notification> {
        let notification = Notification {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            kind: input.kind,
            title: input.title.clone(),
            message: input.message.clone(),
            related_id: input.related_id,
            is_read: false,
            created_at: Utc::now(),
        };

        sqlx::query(
            r"
            INSERT INTO notifications (id, user_id, kind, title, message, related_id,
                                       is_read, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, 0, $7)
            ",
        )
        .bind(notification.id.to_string())
        .bind(notification.user_id.to_string())
        .bind(notification.kind.as_str())
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.related_id.map(|id| id.to_string()))
        .bind(notification.created_at)
        .execute(&self.pool)
        .await?;

        Ok(notification)
    }

    /// List a user's notifications, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_notifications(
        &self,
        user_id: Uuid,
        unread_only: bool,
        limit: i64,
    ) -> AppResult<Vec<Notification>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, kind, title, message, related_id, is_read, created_at
            FROM notifications
            WHERE user_id = $1 AND ($2 = 0 OR is_read = 0)
            ORDER BY created_at DESC
            LIMIT $3
            ",
        )
        .bind(user_id.to_string())
        .bind(unread_only)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_notification).collect()
    }

    /// Number of unread notifications for a user
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn unread_notification_count(&self, user_id: Uuid) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = 0",
        )
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Mark one of the user's notifications as read
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` if the notification is not the user's
    pub async fn mark_notification_read(&self, notification_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = $1 AND user_id = $2")
                .bind(notification_id.to_string())
                .bind(user_id.to_string())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Notification"));
        }
        Ok(())
    }

    /// Mark every notification of the user as read, returning how many changed
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn mark_all_notifications_read(&self, user_id: Uuid) -> AppResult<u64> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = 1 WHERE user_id = $1 AND is_read = 0")
                .bind(user_id.to_string())
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }

    /// Delete one of the user's notifications
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` if the notification is not the user's
    pub async fn delete_notification(&self, notification_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(notification_id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Notification"));
        }
        Ok(())
    }
}

fn row_to_notification(row: &SqliteRow) -> AppResult<Notification> {
    Ok(Notification {
        id: parse_uuid(&row.try_get::<String, _>("id")?)?,
        user_id: parse_uuid(&row.try_get::<String, _>("user_id")?)?,
        kind: row.try_get::<String, _>("kind")?.parse()?,
        title: row.try_get("title")?,
        message: row.try_get("message")?,
        related_id: parse_optional_uuid(row.try_get("related_id")?)?,
        is_read: row.try_get("is_read")?,
        created_at: row.try_get("created_at")?,
    })
}
