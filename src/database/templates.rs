// ABOUTME: Workout template storage scoped to the authoring trainer
// ABOUTME: Exercises are kept as a JSON column on the template row
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{from_json_column, parse_uuid, to_json_column, Database};
use crate::errors::{AppError, AppResult};
use fitcoach_core::models::WorkoutTemplate;

impl Database {
    /// Create workout templates table
    ///
    /// # Errors
    ///
    /// Returns an error if table creation fails
    pub(super) async fn migrate_templates(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS workout_templates (
                id TEXT PRIMARY KEY,
                trainer_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                description TEXT,
                exercises TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_templates_trainer ON workout_templates(trainer_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Store a new template
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_template(&self, template: &WorkoutTemplate) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO workout_templates (id, trainer_id, name, description, exercises,
                                           created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(template.id.to_string())
        .bind(template.trainer_id.to_string())
        .bind(&template.name)
        .bind(&template.description)
        .bind(to_json_column(&template.exercises)?)
        .bind(template.created_at)
        .bind(template.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Get a template owned by `trainer_id`.
    ///
    /// Templates of other trainers are reported as missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_template(
        &self,
        template_id: Uuid,
        trainer_id: Uuid,
    ) -> AppResult<Option<WorkoutTemplate>> {
        let row = sqlx::query(
            r"
            SELECT id, trainer_id, name, description, exercises, created_at, updated_at
            FROM workout_templates WHERE id = $1 AND trainer_id = $2
            ",
        )
        .bind(template_id.to_string())
        .bind(trainer_id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_template).transpose()
    }

    /// List a trainer's templates by name
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_templates(&self, trainer_id: Uuid) -> AppResult<Vec<WorkoutTemplate>> {
        let rows = sqlx::query(
            r"
            SELECT id, trainer_id, name, description, exercises, created_at, updated_at
            FROM workout_templates WHERE trainer_id = $1
            ORDER BY name ASC
            ",
        )
        .bind(trainer_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_template).collect()
    }

    /// Overwrite name, description and exercises
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` if the template does not belong to the trainer
    pub async fn update_template(&self, template: &WorkoutTemplate) -> AppResult<()> {
        let result = sqlx::query(
            r"
            UPDATE workout_templates
            SET name = $3, description = $4, exercises = $5, updated_at = $6
            WHERE id = $1 AND trainer_id = $2
            ",
        )
        .bind(template.id.to_string())
        .bind(template.trainer_id.to_string())
        .bind(&template.name)
        .bind(&template.description)
        .bind(to_json_column(&template.exercises)?)
        .bind(template.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Template"));
        }
        Ok(())
    }

    /// Delete a template. Plan days that copied it keep their exercises.
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` if the template does not belong to the trainer
    pub async fn delete_template(&self, template_id: Uuid, trainer_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM workout_templates WHERE id = $1 AND trainer_id = $2")
            .bind(template_id.to_string())
            .bind(trainer_id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Template"));
        }
        Ok(())
    }
}

fn row_to_template(row: &SqliteRow) -> AppResult<WorkoutTemplate> {
    Ok(WorkoutTemplate {
        id: parse_uuid(&row.try_get::<String, _>("id")?)?,
        trainer_id: parse_uuid(&row.try_get::<String, _>("trainer_id")?)?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        exercises: from_json_column(&row.try_get::<String, _>("exercises")?)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
