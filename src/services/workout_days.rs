// ABOUTME: Completing and failing plan days with photo proof, logging and trainer notification
// ABOUTME: Enforces ownership, no future dates and the one-way pending to terminal transition
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::{AppError, AppResult, ErrorCode};
use crate::logging::AppLogger;
use crate::resources::ServerResources;
use crate::utils::photo::{validate_optional_photo, validate_photo};
use crate::utils::validation::optional_text;
use fitcoach_core::models::{
    DayStatus, NewNotification, NotificationKind, PlanDay, User, WorkoutLog,
};

/// What the client reports for a day
#[derive(Debug, Clone)]
pub enum DayOutcome {
    /// Workout done; a photo is mandatory
    Completed {
        /// Base64 photo proof
        photo: String,
        /// Optional note
        note: Option<String>,
    },
    /// Workout missed
    Failed {
        /// Why it was missed
        reason: Option<String>,
        /// Optional photo
        photo: Option<String>,
    },
}

impl DayOutcome {
    /// Status the day moves to
    #[must_use]
    pub const fn target(&self) -> DayStatus {
        match self {
            Self::Completed { .. } => DayStatus::Completed,
            Self::Failed { .. } => DayStatus::Failed,
        }
    }

    /// Validate and normalize the photo and text, returning `(photo, note)`
    fn into_log_fields(self, max_photo_bytes: usize) -> AppResult<(Option<String>, Option<String>)> {
        match self {
            Self::Completed { photo, note } => {
                validate_photo(&photo, max_photo_bytes)?;
                Ok((Some(photo), optional_text(note.as_deref(), "note")?))
            }
            Self::Failed { reason, photo } => {
                validate_optional_photo(photo.as_deref(), max_photo_bytes)?;
                let photo = photo.filter(|p| !p.trim().is_empty());
                Ok((photo, optional_text(reason.as_deref(), "reason")?))
            }
        }
    }
}

/// A status change and the log written for it
#[derive(Debug, Clone, Serialize)]
pub struct RecordedDay {
    /// Day after the transition
    pub day: PlanDay,
    /// Log created by the transition
    pub log: WorkoutLog,
}

/// Record the outcome of a plan day for `client`.
///
/// `today` is the server's current date; future days cannot be reported.
///
/// # Errors
///
/// - `RESOURCE_NOT_FOUND` when the plan or the day does not exist
/// - `PERMISSION_DENIED` when `client` is not the plan's client
/// - `VALUE_OUT_OF_RANGE` for future dates
/// - `MISSING_REQUIRED_FIELD`, `INVALID_FORMAT` or `PAYLOAD_TOO_LARGE` for a bad photo
/// - `INVALID_STATE_TRANSITION` when the day already left pending
pub async fn record_day_outcome(
    resources: &ServerResources,
    client: &User,
    plan_id: Uuid,
    date: NaiveDate,
    outcome: DayOutcome,
    today: NaiveDate,
) -> AppResult<RecordedDay> {
    let plan = resources
        .database
        .get_plan(plan_id)
        .await?
        .ok_or_else(|| AppError::not_found("Plan"))?;

    if plan.client_id != client.id {
        return Err(AppError::permission_denied(
            "Only the plan's client can report workout days",
        ));
    }

    if date > today {
        return Err(AppError::new(
            ErrorCode::ValueOutOfRange,
            format!("Cannot report the workout on {date} before the day has come"),
        ));
    }

    let day = plan
        .day_on(date)
        .ok_or_else(|| AppError::not_found("Workout day"))?;

    let target = outcome.target();
    day.status.transition(target)?;

    let (photo, note) = outcome.into_log_fields(resources.config.limits.max_photo_bytes)?;
    // After a reassignment the current trainer, not the plan's author, follows the client
    let trainer_id = client.trainer_id.unwrap_or(plan.trainer_id);

    let log = WorkoutLog {
        id: Uuid::new_v4(),
        plan_id: plan.id,
        day_id: day.id,
        client_id: client.id,
        trainer_id,
        date,
        status: target,
        photo,
        note,
        created_at: Utc::now(),
    };

    let updated = resources.database.transition_day(&log).await?;

    AppLogger::log_domain_event(
        "plan_day",
        &updated.id.to_string(),
        target.as_str(),
        &client.id.to_string(),
    );

    let (kind, title, verb) = match target {
        DayStatus::Failed => (NotificationKind::WorkoutFailed, "Workout missed", "missed"),
        _ => (
            NotificationKind::WorkoutCompleted,
            "Workout completed",
            "completed",
        ),
    };
    resources
        .notifier
        .notify(
            NewNotification::new(
                trainer_id,
                kind,
                title,
                format!("{} {verb} the {date} workout of \"{}\"", client.name, plan.title),
            )
            .related_to(plan.id),
        )
        .await;

    Ok(RecordedDay { day: updated, log })
}
