// ABOUTME: One-to-one chat and message storage with unread aggregation
// ABOUTME: A participant pair maps to exactly one chat row through a unique constraint
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{parse_uuid, Database};
use crate::errors::{AppError, AppResult};
use fitcoach_core::models::{Chat, Message};

impl Database {
    /// Create chat and message tables
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails
    pub(super) async fn migrate_chat(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS chats (
                id TEXT PRIMARY KEY,
                participant_a TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                participant_b TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at TEXT NOT NULL,
                last_message_at TEXT,
                UNIQUE(participant_a, participant_b)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS messages (
                id TEXT PRIMARY KEY,
                chat_id TEXT NOT NULL REFERENCES chats(id) ON DELETE CASCADE,
                sender_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                content TEXT NOT NULL,
                is_read INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_messages_chat_created ON messages(chat_id, created_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Return the chat between two users, creating it on first use
    ///
    /// # Errors
    ///
    /// Returns an error if the insert or lookup fails
    pub async fn get_or_create_chat(&self, first: Uuid, second: Uuid) -> AppResult<Chat> {
        let (a, b) = Chat::ordered_pair(first, second);

        sqlx::query(
            r"
            INSERT OR IGNORE INTO chats (id, participant_a, participant_b, created_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(a.to_string())
        .bind(b.to_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let row = sqlx::query(
            r"
            SELECT id, participant_a, participant_b, created_at, last_message_at
            FROM chats WHERE participant_a = $1 AND participant_b = $2
            ",
        )
        .bind(a.to_string())
        .bind(b.to_string())
        .fetch_one(&self.pool)
        .await?;
        row_to_chat(&row)
    }

    /// Get a chat by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_chat(&self, chat_id: Uuid) -> AppResult<Option<Chat>> {
        let row = sqlx::query(
            r"
            SELECT id, participant_a, participant_b, created_at, last_message_at
            FROM chats WHERE id = $1
            ",
        )
        .bind(chat_id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_chat).transpose()
    }

    /// List a user's chats, most recent activity first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_chats(&self, user_id: Uuid) -> AppResult<Vec<Chat>> {
        let rows = sqlx::query(
            r"
            SELECT id, participant_a, participant_b, created_at, last_message_at
            FROM chats
            WHERE participant_a = $1 OR participant_b = $1
            ORDER BY COALESCE(last_message_at, created_at) DESC
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_chat).collect()
    }

    /// Persist a message and bump the chat's activity time
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` if the chat does not exist
    pub async fn create_message(
        &self,
        chat_id: Uuid,
        sender_id: Uuid,
        content: &str,
    ) -> AppResult<Message> {
        let message = Message {
            id: Uuid::new_v4(),
            chat_id,
            sender_id,
            content: content.to_owned(),
            is_read: false,
            created_at: Utc::now(),
        };

        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query("UPDATE chats SET last_message_at = $2 WHERE id = $1")
            .bind(chat_id.to_string())
            .bind(message.created_at)
            .execute(&mut *tx)
            .await?;
        if updated.rows_affected() == 0 {
            return Err(AppError::not_found("Chat"));
        }

        sqlx::query(
            r"
            INSERT INTO messages (id, chat_id, sender_id, content, is_read, created_at)
            VALUES ($1, $2, $3, $4, 0, $5)
            ",
        )
        .bind(message.id.to_string())
        .bind(chat_id.to_string())
        .bind(sender_id.to_string())
        .bind(&message.content)
        .bind(message.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(message)
    }

    /// One page of messages older than `before`, returned oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_messages(
        &self,
        chat_id: Uuid,
        before: Option<DateTime<Utc>>,
        limit: i64,
    ) -> AppResult<Vec<Message>> {
        let rows = sqlx::query(
            r"
            SELECT id, chat_id, sender_id, content, is_read, created_at
            FROM messages
            WHERE chat_id = $1 AND ($2 IS NULL OR created_at < $2)
            ORDER BY created_at DESC, rowid DESC
            LIMIT $3
            ",
        )
        .bind(chat_id.to_string())
        .bind(before)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut messages = rows
            .iter()
            .map(row_to_message)
            .collect::<AppResult<Vec<_>>>()?;
        messages.reverse();
        Ok(messages)
    }

    /// Latest message of a chat
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn last_message(&self, chat_id: Uuid) -> AppResult<Option<Message>> {
        let row = sqlx::query(
            r"
            SELECT id, chat_id, sender_id, content, is_read, created_at
            FROM messages WHERE chat_id = $1
            ORDER BY created_at DESC, rowid DESC
            LIMIT 1
            ",
        )
        .bind(chat_id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_message).transpose()
    }

    /// Messages in one chat sent by the other participant and not yet read
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn unread_count_in_chat(&self, chat_id: Uuid, user_id: Uuid) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM messages
            WHERE chat_id = $1 AND sender_id != $2 AND is_read = 0
            ",
        )
        .bind(chat_id.to_string())
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Unread messages across all of a user's chats
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn total_unread_messages(&self, user_id: Uuid) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM messages m JOIN chats c ON c.id = m.chat_id
            WHERE (c.participant_a = $1 OR c.participant_b = $1)
              AND m.sender_id != $1 AND m.is_read = 0
            ",
        )
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Mark the other participant's messages read, returning how many changed
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn mark_chat_read(&self, chat_id: Uuid, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE messages SET is_read = 1 WHERE chat_id = $1 AND sender_id != $2 AND is_read = 0",
        )
        .bind(chat_id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

fn row_to_chat(row: &SqliteRow) -> AppResult<Chat> {
    Ok(Chat {
        id: parse_uuid(&row.try_get::<String, _>("id")?)?,
        participant_a: parse_uuid(&row.try_get::<String, _>("participant_a")?)?,
        participant_b: parse_uuid(&row.try_get::<String, _>("participant_b")?)?,
        created_at: row.try_get("created_at")?,
        last_message_at: row.try_get("last_message_at")?,
    })
}

fn row_to_message(row: &SqliteRow) -> AppResult<Message> {
    Ok(Message {
        id: parse_uuid(&row.try_get::<String, _>("id")?)?,
        chat_id: parse_uuid(&row.try_get::<String, _>("chat_id")?)?,
        sender_id: parse_uuid(&row.try_get::<String, _>("sender_id")?)?,
        content: row.try_get("content")?,
        is_read: row.try_get("is_read")?,
        created_at: row.try_get("created_at")?,
    })
}
