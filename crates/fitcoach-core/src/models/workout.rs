// ABOUTME: Workout templates, plans, plan days and the one-way day status machine
// ABOUTME: Also defines workout logs written when a client completes or fails a day
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult, ErrorCode};

/// One exercise inside a template or a plan day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Exercise {
    /// Exercise name
    pub name: String,
    /// Number of sets
    pub sets: u32,
    /// Repetitions per set
    pub reps: u32,
    /// Rest between sets
    #[serde(default)]
    pub rest_seconds: Option<u32>,
    /// Coaching notes
    #[serde(default)]
    pub notes: Option<String>,
}

impl Exercise {
    /// Validate a single exercise
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or sets/reps are zero
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::missing_field("exercises[].name"));
        }
        if self.sets == 0 || self.reps == 0 {
            return Err(AppError::new(
                ErrorCode::ValueOutOfRange,
                format!("Exercise '{}' needs at least one set and one rep", self.name),
            ));
        }
        Ok(())
    }

    /// Validate a non-empty list of exercises
    ///
    /// # Errors
    ///
    /// Returns an error if the list is empty or any exercise is invalid
    pub fn validate_all(exercises: &[Self]) -> AppResult<()> {
        if exercises.is_empty() {
            return Err(AppError::invalid_input("At least one exercise is required"));
        }
        exercises.iter().try_for_each(Self::validate)
    }
}

/// Reusable workout authored by a trainer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutTemplate {
    /// Template id
    pub id: Uuid,
    /// Owning trainer
    pub trainer_id: Uuid,
    /// Template name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Exercises in order
    pub exercises: Vec<Exercise>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update
    pub updated_at: DateTime<Utc>,
}

/// Status of a scheduled plan day.
///
/// `Pending` may move to `Completed` or `Failed`; both are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    /// Not yet reported
    #[default]
    Pending,
    /// Done, with photo proof
    Completed,
    /// Reported as missed
    Failed,
}

impl DayStatus {
    /// Convert to string for database storage
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Completed and failed days never change again
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Apply a transition, returning the new status
    ///
    /// # Errors
    ///
    /// Returns `INVALID_STATE_TRANSITION` when the current status is terminal
    /// or when the target is `Pending`
    pub fn transition(self, target: Self) -> AppResult<Self> {
        match (self, target) {
            (Self::Pending, Self::Completed | Self::Failed) => Ok(target),
            (Self::Pending, Self::Pending) => Err(AppError::invalid_input(
                "A day can only be marked completed or failed",
            )),
            (current, _) => Err(AppError::invalid_transition(format!(
                "Workout day is already {current}"
            ))
            .with_details(serde_json::json!({ "status": current.as_str() }))),
        }
    }
}

impl Display for DayStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(AppError::invalid_input(format!("Invalid day status: {s}"))),
        }
    }
}

/// One scheduled day of a plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanDay {
    /// Day id
    pub id: Uuid,
    /// Owning plan
    pub plan_id: Uuid,
    /// Calendar date, unique within the plan
    pub date: NaiveDate,
    /// Optional label ("Leg day")
    pub title: Option<String>,
    /// Template the exercises were copied from
    pub template_id: Option<Uuid>,
    /// Exercises for the day
    pub exercises: Vec<Exercise>,
    /// Current status
    pub status: DayStatus,
    /// Log written when the status left `Pending`
    pub log_id: Option<Uuid>,
    /// When the status left `Pending`
    pub status_changed_at: Option<DateTime<Utc>>,
}

/// Plan assigned by a trainer to a client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutPlan {
    /// Plan id
    pub id: Uuid,
    /// Client receiving the plan
    pub client_id: Uuid,
    /// Authoring trainer
    pub trainer_id: Uuid,
    /// Plan title
    pub title: String,
    /// Optional description
    pub description: Option<String>,
    /// Days ordered by date
    pub days: Vec<PlanDay>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update
    pub updated_at: DateTime<Utc>,
}

impl WorkoutPlan {
    /// Find the day scheduled on `date`
    #[must_use]
    pub fn day_on(&self, date: NaiveDate) -> Option<&PlanDay> {
        self.days.iter().find(|d| d.date == date)
    }
}

/// Record written for every completed or failed day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutLog {
    /// Log id
    pub id: Uuid,
    /// Plan the day belongs to
    pub plan_id: Uuid,
    /// Day that changed status
    pub day_id: Uuid,
    /// Reporting client
    pub client_id: Uuid,
    /// Plan trainer
    pub trainer_id: Uuid,
    /// Calendar date of the day
    pub date: NaiveDate,
    /// Terminal status reported
    pub status: DayStatus,
    /// Base64 photo proof
    pub photo: Option<String>,
    /// Client note or failure reason
    pub note: Option<String>,
    /// When it was logged
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_moves_to_terminal_states() {
        assert_eq!(
            DayStatus::Pending.transition(DayStatus::Completed).unwrap(),
            DayStatus::Completed
        );
        assert_eq!(
            DayStatus::Pending.transition(DayStatus::Failed).unwrap(),
            DayStatus::Failed
        );
    }

    #[test]
    fn test_terminal_states_are_final() {
        for current in [DayStatus::Completed, DayStatus::Failed] {
            for target in [DayStatus::Pending, DayStatus::Completed, DayStatus::Failed] {
                let err = current.transition(target).unwrap_err();
                assert_eq!(err.code, ErrorCode::InvalidStateTransition);
            }
        }
    }

    #[test]
    fn test_pending_to_pending_is_rejected() {
        let err = DayStatus::Pending.transition(DayStatus::Pending).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    #[test]
    fn test_exercise_validation() {
        let good = Exercise {
            name: "Squat".into(),
            sets: 3,
            reps: 10,
            rest_seconds: Some(90),
            notes: None,
        };
        assert!(good.validate().is_ok());

        let zero_sets = Exercise { sets: 0, ..good.clone() };
        assert_eq!(zero_sets.validate().unwrap_err().code, ErrorCode::ValueOutOfRange);

        let blank = Exercise { name: "  ".into(), ..good };
        assert_eq!(blank.validate().unwrap_err().code, ErrorCode::MissingRequiredField);

        assert!(Exercise::validate_all(&[]).is_err());
    }
}
