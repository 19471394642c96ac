// ABOUTME: Workout plan and plan day storage, including the atomic day status transition
// ABOUTME: Plans own their days; a day leaves pending once, together with its workout log
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use chrono::{NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use uuid::Uuid;

use super::{from_json_column, parse_optional_uuid, parse_uuid, to_json_column, Database};
use crate::errors::{AppError, AppResult};
use fitcoach_core::models::{DayStatus, PlanDay, WorkoutLog, WorkoutPlan};

const DAY_COLUMNS: &str =
    "id, plan_id, date, title, template_id, exercises, status, log_id, status_changed_at";

/// Optional filters for plan listings
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanFilter {
    /// Plans assigned to this client
    pub client_id: Option<Uuid>,
    /// Plans of the clients currently assigned to this trainer
    pub coached_by: Option<Uuid>,
}

impl Database {
    /// Create workout plan and plan day tables
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails
    pub(super) async fn migrate_plans(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS workout_plans (
                id TEXT PRIMARY KEY,
                client_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                trainer_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                description TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS plan_days (
                id TEXT PRIMARY KEY,
                plan_id TEXT NOT NULL REFERENCES workout_plans(id) ON DELETE CASCADE,
                date TEXT NOT NULL,
                title TEXT,
                template_id TEXT,
                exercises TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending'
                    CHECK (status IN ('pending', 'completed', 'failed')),
                log_id TEXT,
                status_changed_at TEXT,
                UNIQUE(plan_id, date)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_plans_client ON workout_plans(client_id)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_plans_trainer ON workout_plans(trainer_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Store a plan and all of its days in one transaction
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_ALREADY_EXISTS` when two days share a date
    pub async fn create_plan(&self, plan: &WorkoutPlan) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            INSERT INTO workout_plans (id, client_id, trainer_id, title, description,
                                       created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(plan.id.to_string())
        .bind(plan.client_id.to_string())
        .bind(plan.trainer_id.to_string())
        .bind(&plan.title)
        .bind(&plan.description)
        .bind(plan.created_at)
        .bind(plan.updated_at)
        .execute(&mut *tx)
        .await?;

        for day in &plan.days {
            insert_day(&mut tx, day).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Get a plan with its days ordered by date
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_plan(&self, plan_id: Uuid) -> AppResult<Option<WorkoutPlan>> {
        let row = sqlx::query(
            r"
            SELECT id, client_id, trainer_id, title, description, created_at, updated_at
            FROM workout_plans WHERE id = $1
            ",
        )
        .bind(plan_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let mut plan = row_to_plan(&row)?;
                plan.days = self.get_plan_days(plan.id).await?;
                Ok(Some(plan))
            }
            None => Ok(None),
        }
    }

    /// List plans newest first, each with its days
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_plans(&self, filter: PlanFilter) -> AppResult<Vec<WorkoutPlan>> {
        let rows = sqlx::query(
            r"
            SELECT id, client_id, trainer_id, title, description, created_at, updated_at
            FROM workout_plans
            WHERE ($1 IS NULL OR client_id = $1)
              AND ($2 IS NULL OR client_id IN (SELECT id FROM users WHERE trainer_id = $2))
            ORDER BY created_at DESC
            ",
        )
        .bind(filter.client_id.map(|id| id.to_string()))
        .bind(filter.coached_by.map(|id| id.to_string()))
        .fetch_all(&self.pool)
        .await?;

        let mut plans = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut plan = row_to_plan(row)?;
            plan.days = self.get_plan_days(plan.id).await?;
            plans.push(plan);
        }
        Ok(plans)
    }

    /// Days of one plan ordered by date
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_plan_days(&self, plan_id: Uuid) -> AppResult<Vec<PlanDay>> {
        let rows = sqlx::query(&format!(
            "SELECT {DAY_COLUMNS} FROM plan_days WHERE plan_id = $1 ORDER BY date ASC"
        ))
        .bind(plan_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_day).collect()
    }

    /// Update title and description and append new days
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_ALREADY_EXISTS` if a new day collides with an existing date
    pub async fn update_plan(
        &self,
        plan_id: Uuid,
        title: &str,
        description: Option<&str>,
        new_days: &[PlanDay],
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE workout_plans SET title = $2, description = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(plan_id.to_string())
        .bind(title)
        .bind(description)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Plan"));
        }

        for day in new_days {
            insert_day(&mut tx, day).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Delete a plan with its days and logs
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` if the plan does not exist
    pub async fn delete_plan(&self, plan_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM workout_plans WHERE id = $1")
            .bind(plan_id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Plan"));
        }
        Ok(())
    }

    /// Move a pending day to the log's status and store the log.
    ///
    /// The status change is a conditional update, so two concurrent reports
    /// for the same day cannot both succeed.
    ///
    /// # Errors
    ///
    /// - `RESOURCE_NOT_FOUND` when the plan has no day on `log.date`
    /// - `INVALID_STATE_TRANSITION` when the day already left pending
    pub async fn transition_day(&self, log: &WorkoutLog) -> AppResult<PlanDay> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r"
            UPDATE plan_days SET status = $3, log_id = $4, status_changed_at = $5
            WHERE plan_id = $1 AND date = $2 AND status = 'pending'
            ",
        )
        .bind(log.plan_id.to_string())
        .bind(log.date)
        .bind(log.status.as_str())
        .bind(log.id.to_string())
        .bind(log.created_at)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            let current: Option<String> =
                sqlx::query_scalar("SELECT status FROM plan_days WHERE plan_id = $1 AND date = $2")
                    .bind(log.plan_id.to_string())
                    .bind(log.date)
                    .fetch_optional(&mut *tx)
                    .await?;

            let Some(current) = current else {
                return Err(AppError::not_found("Workout day"));
            };
            let current: DayStatus = current.parse()?;
            current.transition(log.status)?;
            return Err(AppError::internal("Workout day update was not applied"));
        }

        super::logs::insert_log(&mut tx, log).await?;

        let row = sqlx::query(&format!(
            "SELECT {DAY_COLUMNS} FROM plan_days WHERE plan_id = $1 AND date = $2"
        ))
        .bind(log.plan_id.to_string())
        .bind(log.date)
        .fetch_one(&mut *tx)
        .await?;
        let day = row_to_day(&row)?;

        tx.commit().await?;
        Ok(day)
    }

    /// Date and status of every day across a client's plans within `[from, to]`
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn day_statuses_for_client(
        &self,
        client_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<(NaiveDate, DayStatus)>> {
        let rows = sqlx::query(
            r"
            SELECT d.date, d.status
            FROM plan_days d JOIN workout_plans p ON p.id = d.plan_id
            WHERE p.client_id = $1 AND d.date BETWEEN $2 AND $3
            ORDER BY d.date ASC
            ",
        )
        .bind(client_id.to_string())
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_date_status).collect()
    }

    /// Date and status of every day of one plan within `[from, to]`
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn day_statuses_for_plan(
        &self,
        plan_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<(NaiveDate, DayStatus)>> {
        let rows = sqlx::query(
            r"
            SELECT date, status FROM plan_days
            WHERE plan_id = $1 AND date BETWEEN $2 AND $3
            ORDER BY date ASC
            ",
        )
        .bind(plan_id.to_string())
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_date_status).collect()
    }

    /// Total number of plans
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn count_plans(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workout_plans")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

async fn insert_day(conn: &mut SqliteConnection, day: &PlanDay) -> AppResult<()> {
    let result = sqlx::query(
        r"
        INSERT INTO plan_days (id, plan_id, date, title, template_id, exercises, status,
                               log_id, status_changed_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ",
    )
    .bind(day.id.to_string())
    .bind(day.plan_id.to_string())
    .bind(day.date)
    .bind(&day.title)
    .bind(day.template_id.map(|id| id.to_string()))
    .bind(to_json_column(&day.exercises)?)
    .bind(day.status.as_str())
    .bind(day.log_id.map(|id| id.to_string()))
    .bind(day.status_changed_at)
    .execute(conn)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::already_exists(
            format!("Plan already has a day on {}", day.date),
        )),
        Err(e) => Err(e.into()),
    }
}

fn row_to_plan(row: &SqliteRow) -> AppResult<WorkoutPlan> {
    Ok(WorkoutPlan {
        id: parse_uuid(&row.try_get::<String, _>("id")?)?,
        client_id: parse_uuid(&row.try_get::<String, _>("client_id")?)?,
        trainer_id: parse_uuid(&row.try_get::<String, _>("trainer_id")?)?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        days: Vec::new(),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_day(row: &SqliteRow) -> AppResult<PlanDay> {
    Ok(PlanDay {
        id: parse_uuid(&row.try_get::<String, _>("id")?)?,
        plan_id: parse_uuid(&row.try_get::<String, _>("plan_id")?)?,
        date: row.try_get("date")?,
        title: row.try_get("title")?,
        template_id: parse_optional_uuid(row.try_get("template_id")?)?,
        exercises: from_json_column(&row.try_get::<String, _>("exercises")?)?,
        status: row.try_get::<String, _>("status")?.parse()?,
        log_id: parse_optional_uuid(row.try_get("log_id")?)?,
        status_changed_at: row.try_get("status_changed_at")?,
    })
}

fn row_to_date_status(row: &SqliteRow) -> AppResult<(NaiveDate, DayStatus)> {
    Ok((
        row.try_get("date")?,
        row.try_get::<String, _>("status")?.parse()?,
    ))
}
