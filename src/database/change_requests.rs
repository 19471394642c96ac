// ABOUTME: Trainer change request storage and the admin decision workflow
// ABOUTME: Approval reassigns the client in the same transaction that closes the request
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use uuid::Uuid;

use super::{parse_optional_uuid, parse_uuid, Database};
use crate::errors::{AppError, AppResult};
use fitcoach_core::models::{ChangeTrainerRequest, RequestStatus};

const REQUEST_COLUMNS: &str = "id, client_id, current_trainer_id, requested_trainer_id, reason, \
     status, admin_note, reviewed_by, reviewed_at, created_at";

/// Optional filters for change request listings
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeRequestFilter {
    /// Requests submitted by this client
    pub client_id: Option<Uuid>,
    /// Requests in this state
    pub status: Option<RequestStatus>,
}

impl Database {
    /// Create change requests table.
    ///
    /// A partial unique index allows one pending request per client.
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails
    pub(super) async fn migrate_change_requests(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS change_requests (
                id TEXT PRIMARY KEY,
                client_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                current_trainer_id TEXT REFERENCES users(id) ON DELETE SET NULL,
                requested_trainer_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                reason TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending'
                    CHECK (status IN ('pending', 'approved', 'rejected')),
                admin_note TEXT,
                reviewed_by TEXT REFERENCES users(id) ON DELETE SET NULL,
                reviewed_at TEXT,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_change_requests_one_pending
            ON change_requests(client_id) WHERE status = 'pending'
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Store a new pending request
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_ALREADY_EXISTS` if the client already has a pending request
    pub async fn create_change_request(&self, request: &ChangeTrainerRequest) -> AppResult<()> {
        let result = sqlx::query(&format!(
            "INSERT INTO change_requests ({REQUEST_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"
        ))
        .bind(request.id.to_string())
        .bind(request.client_id.to_string())
        .bind(request.current_trainer_id.map(|id| id.to_string()))
        .bind(request.requested_trainer_id.to_string())
        .bind(&request.reason)
        .bind(request.status.as_str())
        .bind(&request.admin_note)
        .bind(request.reviewed_by.map(|id| id.to_string()))
        .bind(request.reviewed_at)
        .bind(request.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(
                AppError::already_exists("A pending change request already exists"),
            ),
            Err(e) => Err(e.into()),
        }
    }

    /// Get a request by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_change_request(
        &self,
        request_id: Uuid,
    ) -> AppResult<Option<ChangeTrainerRequest>> {
        let row = sqlx::query(&format!(
            "SELECT {REQUEST_COLUMNS} FROM change_requests WHERE id = $1"
        ))
        .bind(request_id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_request).transpose()
    }

    /// List requests, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_change_requests(
        &self,
        filter: ChangeRequestFilter,
    ) -> AppResult<Vec<ChangeTrainerRequest>> {
        let rows = sqlx::query(&format!(
            "SELECT {REQUEST_COLUMNS} FROM change_requests
             WHERE ($1 IS NULL OR client_id = $1) AND ($2 IS NULL OR status = $2)
             ORDER BY created_at DESC"
        ))
        .bind(filter.client_id.map(|id| id.to_string()))
        .bind(filter.status.map(RequestStatus::as_str))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_request).collect()
    }

    /// Withdraw a client's own pending request
    ///
    /// # Errors
    ///
    /// - `RESOURCE_NOT_FOUND` if the request does not exist or belongs to another client
    /// - `INVALID_STATE_TRANSITION` if it was already decided
    pub async fn cancel_change_request(&self, request_id: Uuid, client_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "DELETE FROM change_requests WHERE id = $1 AND client_id = $2 AND status = 'pending'",
        )
        .bind(request_id.to_string())
        .bind(client_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        match self.get_change_request(request_id).await? {
            Some(request) if request.client_id == client_id => {
                request.status.ensure_pending()?;
                Err(AppError::internal("Change request was not removed"))
            }
            _ => Err(AppError::not_found("Change request")),
        }
    }

    /// Approve a pending request and reassign the client to the requested trainer
    ///
    /// # Errors
    ///
    /// - `RESOURCE_NOT_FOUND` if the request does not exist
    /// - `INVALID_STATE_TRANSITION` if it was already decided
    pub async fn approve_change_request(
        &self,
        request_id: Uuid,
        admin_id: Uuid,
        note: Option<&str>,
    ) -> AppResult<ChangeTrainerRequest> {
        let mut tx = self.pool.begin().await?;

        decide(&mut tx, request_id, RequestStatus::Approved, admin_id, note).await?;
        let request = fetch_request(&mut tx, request_id).await?;

        sqlx::query("UPDATE users SET trainer_id = $2, updated_at = $3 WHERE id = $1")
            .bind(request.client_id.to_string())
            .bind(request.requested_trainer_id.to_string())
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(request)
    }

    /// Reject a pending request
    ///
    /// # Errors
    ///
    /// - `RESOURCE_NOT_FOUND` if the request does not exist
    /// - `INVALID_STATE_TRANSITION` if it was already decided
    pub async fn reject_change_request(
        &self,
        request_id: Uuid,
        admin_id: Uuid,
        note: Option<&str>,
    ) -> AppResult<ChangeTrainerRequest> {
        let mut tx = self.pool.begin().await?;
        decide(&mut tx, request_id, RequestStatus::Rejected, admin_id, note).await?;
        let request = fetch_request(&mut tx, request_id).await?;
        tx.commit().await?;
        Ok(request)
    }

    /// Number of requests awaiting a decision
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn count_pending_change_requests(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM change_requests WHERE status = 'pending'")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}

async fn decide(
    conn: &mut SqliteConnection,
    request_id: Uuid,
    decision: RequestStatus,
    admin_id: Uuid,
    note: Option<&str>,
) -> AppResult<()> {
    let result = sqlx::query(
        r"
        UPDATE change_requests
        SET status = $2, admin_note = $3, reviewed_by = $4, reviewed_at = $5
        WHERE id = $1 AND status = 'pending'
        ",
    )
    .bind(request_id.to_string())
    .bind(decision.as_str())
    .bind(note)
    .bind(admin_id.to_string())
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        let current: Option<String> =
            sqlx::query_scalar("SELECT status FROM change_requests WHERE id = $1")
                .bind(request_id.to_string())
                .fetch_optional(&mut *conn)
                .await?;
        let Some(current) = current else {
            return Err(AppError::not_found("Change request"));
        };
        current.parse::<RequestStatus>()?.ensure_pending()?;
        return Err(AppError::internal("Change request decision was not applied"));
    }
    Ok(())
}

async fn fetch_request(
    conn: &mut SqliteConnection,
    request_id: Uuid,
) -> AppResult<ChangeTrainerRequest> {
    let row = sqlx::query(&format!(
        "SELECT {REQUEST_COLUMNS} FROM change_requests WHERE id = $1"
    ))
    .bind(request_id.to_string())
    .fetch_one(conn)
    .await?;
    row_to_request(&row)
}

fn row_to_request(row: &SqliteRow) -> AppResult<ChangeTrainerRequest> {
    Ok(ChangeTrainerRequest {
        id: parse_uuid(&row.try_get::<String, _>("id")?)?,
        client_id: parse_uuid(&row.try_get::<String, _>("client_id")?)?,
        current_trainer_id: parse_optional_uuid(row.try_get("current_trainer_id")?)?,
        requested_trainer_id: parse_uuid(&row.try_get::<String, _>("requested_trainer_id")?)?,
        reason: row.try_get("reason")?,
        status: row.try_get::<String, _>("status")?.parse()?,
        admin_note: row.try_get("admin_note")?,
        reviewed_by: parse_optional_uuid(row.try_get("reviewed_by")?)?,
        reviewed_at: row.try_get("reviewed_at")?,
        created_at: row.try_get("created_at")?,
    })
}
