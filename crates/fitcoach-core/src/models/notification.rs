// ABOUTME: In-app notification document and the kinds of events that produce one
// ABOUTME: Notifications are owner-scoped and carry a read flag for unread counts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

/// Event that produced a notification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Trainer assigned a new plan to the client
    PlanAssigned,
    /// Client completed a day
    WorkoutCompleted,
    /// Client failed a day
    WorkoutFailed,
    /// Client picked this trainer
    TrainerSelected,
    /// Trainer application approved
    TrainerApproved,
    /// Trainer application rejected
    TrainerRejected,
    /// Client's change request approved
    ChangeRequestApproved,
    /// Client's change request rejected
    ChangeRequestRejected,
    /// Trainer lost a client through a change request
    TrainerReassigned,
    /// Trainer gained a client through a change request
    NewClient,
    /// Account suspended by an admin
    AccountSuspended,
}

impl NotificationKind {
    /// Convert to string for database storage
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PlanAssigned => "plan_assigned",
            Self::WorkoutCompleted => "workout_completed",
            Self::WorkoutFailed => "workout_failed",
            Self::TrainerSelected => "trainer_selected",
            Self::TrainerApproved => "trainer_approved",
            Self::TrainerRejected => "trainer_rejected",
            Self::ChangeRequestApproved => "change_request_approved",
            Self::ChangeRequestRejected => "change_request_rejected",
            Self::TrainerReassigned => "trainer_reassigned",
            Self::NewClient => "new_client",
            Self::AccountSuspended => "account_suspended",
        }
    }
}

impl FromStr for NotificationKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "plan_assigned" => Self::PlanAssigned,
            "workout_completed" => Self::WorkoutCompleted,
            "workout_failed" => Self::WorkoutFailed,
            "trainer_selected" => Self::TrainerSelected,
            "trainer_approved" => Self::TrainerApproved,
            "trainer_rejected" => Self::TrainerRejected,
            "change_request_approved" => Self::ChangeRequestApproved,
            "change_request_rejected" => Self::ChangeRequestRejected,
            "trainer_reassigned" => Self::TrainerReassigned,
            "new_client" => Self::NewClient,
            "account_suspended" => Self::AccountSuspended,
            _ => {
                return Err(AppError::invalid_input(format!(
                    "Invalid notification kind: {s}"
                )))
            }
        })
    }
}

/// Notification delivered to a single user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Notification id
    pub id: Uuid,
    /// Recipient
    pub user_id: Uuid,
    /// Event kind
    pub kind: NotificationKind,
    /// Short title
    pub title: String,
    /// Body text
    pub message: String,
    /// Id of the related document (plan, request, user)
    pub related_id: Option<Uuid>,
    /// Read flag
    pub is_read: bool,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Input for creating a notification
#[derive(Debug, Clone)]
pub struct NewNotification {
    /// Recipient
    pub user_id: Uuid,
    /// Event kind
    pub kind: NotificationKind,
    /// Short title
    pub title: String,
    /// Body text
    pub message: String,
    /// Related document id
    pub related_id: Option<Uuid>,
}

impl NewNotification {
    /// Build a notification input
    pub fn new(
        user_id: Uuid,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            kind,
            title: title.into(),
            message: message.into(),
            related_id: None,
        }
    }

    /// Attach the related document id
    #[must_use]
    pub const fn related_to(mut self, related_id: Uuid) -> Self {
        self.related_id = Some(related_id);
        self
    }
}
