// ABOUTME: User document, account status and trainer application status
// ABOUTME: Includes the public profile projection returned by the API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::permissions::UserRole;

/// Account status controlled by admins
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// Account may log in
    #[default]
    Active,
    /// Account suspended by an admin
    Suspended,
}

impl UserStatus {
    /// Check if user can login
    #[must_use]
    pub const fn can_login(self) -> bool {
        matches!(self, Self::Active)
    }

    /// Convert to string for database storage
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
        }
    }
}

impl Display for UserStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "suspended" => Ok(Self::Suspended),
            _ => Err(AppError::invalid_input(format!("Invalid user status: {s}"))),
        }
    }
}

/// Trainer application state. Clients and admins stay at `None`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrainerStatus {
    /// Not a trainer account
    #[default]
    None,
    /// Awaiting admin review
    Pending,
    /// Allowed to coach clients
    Approved,
    /// Application declined
    Rejected,
}

impl TrainerStatus {
    /// Convert to string for database storage
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl Display for TrainerStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrainerStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(AppError::invalid_input(format!(
                "Invalid trainer status: {s}"
            ))),
        }
    }
}

/// Editable profile fields shared by clients and trainers
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProfileDetails {
    /// Age in years
    pub age: Option<u32>,
    /// Free-form gender
    pub gender: Option<String>,
    /// Height in centimetres
    pub height_cm: Option<f64>,
    /// Weight in kilograms
    pub weight_kg: Option<f64>,
    /// Client training goal
    pub goal: Option<String>,
    /// Short biography
    pub bio: Option<String>,
    /// Trainer specialization
    pub specialization: Option<String>,
    /// Trainer experience
    pub experience_years: Option<u32>,
    /// Trainer certifications
    pub certifications: Option<String>,
    /// Base64 profile picture
    pub profile_photo: Option<String>,
}

/// A registered account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: Uuid,
    /// Lowercased email address
    pub email: String,
    /// bcrypt password hash
    pub password_hash: String,
    /// Display name
    pub name: String,
    /// Account role
    pub role: UserRole,
    /// Admin-controlled account status
    pub status: UserStatus,
    /// Trainer application state
    pub trainer_status: TrainerStatus,
    /// Reason recorded when a trainer application is rejected
    pub rejection_reason: Option<String>,
    /// Assigned trainer (clients only)
    pub trainer_id: Option<Uuid>,
    /// Profile fields
    pub profile: ProfileDetails,
    /// When the account was created
    pub created_at: DateTime<Utc>,
    /// Last profile or account change
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new account. Trainers start with a pending application.
    #[must_use]
    pub fn new(email: &str, password_hash: String, name: String, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: email.trim().to_lowercase(),
            password_hash,
            name,
            role,
            status: UserStatus::Active,
            trainer_status: if role == UserRole::Trainer {
                TrainerStatus::Pending
            } else {
                TrainerStatus::None
            },
            rejection_reason: None,
            trainer_id: None,
            profile: ProfileDetails::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// A trainer whose application has been approved
    #[must_use]
    pub fn is_approved_trainer(&self) -> bool {
        self.role == UserRole::Trainer && self.trainer_status == TrainerStatus::Approved
    }

    /// Whether this user coaches the given client
    #[must_use]
    pub fn coaches(&self, client: &Self) -> bool {
        client.role == UserRole::Client && client.trainer_id == Some(self.id)
    }
}

/// Public projection of a [`User`] without credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// User identifier
    pub id: Uuid,
    /// Email address
    pub email: String,
    /// Display name
    pub name: String,
    /// Account role
    pub role: UserRole,
    /// Account status
    pub status: UserStatus,
    /// Trainer application state
    pub trainer_status: TrainerStatus,
    /// Rejection reason for trainer applications
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    /// Assigned trainer (clients only)
    pub trainer_id: Option<Uuid>,
    /// Profile fields
    #[serde(flatten)]
    pub profile: ProfileDetails,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            status: user.status,
            trainer_status: user.trainer_status,
            rejection_reason: user.rejection_reason.clone(),
            trainer_id: user.trainer_id,
            profile: user.profile.clone(),
            created_at: user.created_at,
        }
    }
}

/// Trainer directory entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerSummary {
    /// Trainer profile
    #[serde(flatten)]
    pub profile: UserProfile,
    /// Number of clients currently assigned
    pub client_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trainer_starts_pending() {
        let trainer = User::new("Coach@Example.com", "h".into(), "Coach".into(), UserRole::Trainer);
        assert_eq!(trainer.trainer_status, TrainerStatus::Pending);
        assert_eq!(trainer.email, "coach@example.com");
        assert!(!trainer.is_approved_trainer());

        let client = User::new("c@example.com", "h".into(), "C".into(), UserRole::Client);
        assert_eq!(client.trainer_status, TrainerStatus::None);
    }

    #[test]
    fn test_coaches_requires_assignment() {
        let mut trainer = User::new("t@example.com", "h".into(), "T".into(), UserRole::Trainer);
        trainer.trainer_status = TrainerStatus::Approved;
        let mut client = User::new("c@example.com", "h".into(), "C".into(), UserRole::Client);
        assert!(!trainer.coaches(&client));
        client.trainer_id = Some(trainer.id);
        assert!(trainer.coaches(&client));
    }

    #[test]
    fn test_profile_hides_password_hash() {
        let user = User::new("c@example.com", "secret-hash".into(), "C".into(), UserRole::Client);
        let json = serde_json::to_string(&UserProfile::from(&user)).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("\"role\":\"client\""));
    }
}
