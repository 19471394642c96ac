// ABOUTME: Workout log storage written alongside every plan day status change
// ABOUTME: Logs are read-only after creation and filtered by client, trainer and date range
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use uuid::Uuid;

use super::{parse_uuid, Database};
use crate::errors::AppResult;
use fitcoach_core::models::WorkoutLog;

const LOG_COLUMNS: &str =
    "id, plan_id, day_id, client_id, trainer_id, date, status, photo, note, created_at";

/// Optional filters for log listings
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFilter {
    /// Logs reported by this client
    pub client_id: Option<Uuid>,
    /// Logs of the clients currently assigned to this trainer
    pub coached_by: Option<Uuid>,
    /// Earliest day date, inclusive
    pub from: Option<NaiveDate>,
    /// Latest day date, inclusive
    pub to: Option<NaiveDate>,
}

impl Database {
    /// Create workout logs table
    ///
    /// # Errors
    ///
    /// Returns an error if table creation fails
    pub(super) async fn migrate_logs(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS workout_logs (
                id TEXT PRIMARY KEY,
                plan_id TEXT NOT NULL REFERENCES workout_plans(id) ON DELETE CASCADE,
                day_id TEXT NOT NULL,
                client_id TEXT NOT NULL,
                trainer_id TEXT NOT NULL,
                date TEXT NOT NULL,
                status TEXT NOT NULL CHECK (status IN ('completed', 'failed')),
                photo TEXT,
                note TEXT,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_logs_client_date ON workout_logs(client_id, date)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get a single log
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_log(&self, log_id: Uuid) -> AppResult<Option<WorkoutLog>> {
        let row = sqlx::query(&format!("SELECT {LOG_COLUMNS} FROM workout_logs WHERE id = $1"))
            .bind(log_id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_log).transpose()
    }

    /// List logs, most recent day first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_logs(&self, filter: LogFilter) -> AppResult<Vec<WorkoutLog>> {
        let rows = sqlx::query(&format!(
            "SELECT {LOG_COLUMNS} FROM workout_logs
             WHERE ($1 IS NULL OR client_id = $1)
               AND ($2 IS NULL OR client_id IN (SELECT id FROM users WHERE trainer_id = $2))
               AND ($3 IS NULL OR date >= $3)
               AND ($4 IS NULL OR date <= $4)
             ORDER BY date DESC, created_at DESC"
        ))
        .bind(filter.client_id.map(|id| id.to_string()))
        .bind(filter.coached_by.map(|id| id.to_string()))
        .bind(filter.from)
        .bind(filter.to)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_log).collect()
    }

    /// Total number of logs
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn count_logs(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workout_logs")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Insert a log inside the caller's transaction
pub(super) async fn insert_log(conn: &mut SqliteConnection, log: &WorkoutLog) -> AppResult<()> {
    sqlx::query(&format!(
        "INSERT INTO workout_logs ({LOG_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"
    ))
    .bind(log.id.to_string())
    .bind(log.plan_id.to_string())
    .bind(log.day_id.to_string())
    .bind(log.client_id.to_string())
    .bind(log.trainer_id.to_string())
    .bind(log.date)
    .bind(log.status.as_str())
    .bind(&log.photo)
    .bind(&log.note)
    .bind(log.created_at)
    .execute(conn)
    .await?;
    Ok(())
}

fn row_to_log(row: &SqliteRow) -> AppResult<WorkoutLog> {
    Ok(WorkoutLog {
        id: parse_uuid(&row.try_get::<String, _>("id")?)?,
        plan_id: parse_uuid(&row.try_get::<String, _>("plan_id")?)?,
        day_id: parse_uuid(&row.try_get::<String, _>("day_id")?)?,
        client_id: parse_uuid(&row.try_get::<String, _>("client_id")?)?,
        trainer_id: parse_uuid(&row.try_get::<String, _>("trainer_id")?)?,
        date: row.try_get("date")?,
        status: row.try_get::<String, _>("status")?.parse()?,
        photo: row.try_get("photo")?,
        note: row.try_get("note")?,
        created_at: row.try_get("created_at")?,
    })
}
