// ABOUTME: Trainer change request document submitted by clients and decided by admins
// ABOUTME: Requests move from pending to approved or rejected exactly once
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Review status of a change request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Awaiting admin decision
    #[default]
    Pending,
    /// Client was reassigned
    Approved,
    /// Request declined
    Rejected,
}

impl RequestStatus {
    /// Convert to string for database storage
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Ensure a decision can still be recorded
    ///
    /// # Errors
    ///
    /// Returns `INVALID_STATE_TRANSITION` when already decided
    pub fn ensure_pending(self) -> AppResult<()> {
        if self == Self::Pending {
            Ok(())
        } else {
            Err(AppError::invalid_transition(format!(
                "Change request is already {}",
                self.as_str()
            )))
        }
    }
}

impl FromStr for RequestStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(AppError::invalid_input(format!(
                "Invalid request status: {s}"
            ))),
        }
    }
}

/// A client's request to move to a different trainer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeTrainerRequest {
    /// Request id
    pub id: Uuid,
    /// Requesting client
    pub client_id: Uuid,
    /// Trainer at submission time
    pub current_trainer_id: Option<Uuid>,
    /// Desired trainer
    pub requested_trainer_id: Uuid,
    /// Client's explanation
    pub reason: String,
    /// Review status
    pub status: RequestStatus,
    /// Note left by the reviewing admin
    pub admin_note: Option<String>,
    /// Reviewing admin
    pub reviewed_by: Option<Uuid>,
    /// Decision time
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Submission time
    pub created_at: DateTime<Utc>,
}
