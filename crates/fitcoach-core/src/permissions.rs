// ABOUTME: Role model for the FitCoach platform (client, trainer, admin)
// ABOUTME: Provides role parsing, storage strings and capability checks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Account role. Every route guard is expressed in terms of this enum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Trainee receiving plans
    #[default]
    Client,
    /// Coach authoring templates and plans
    Trainer,
    /// Platform operator
    Admin,
}

impl UserRole {
    /// Convert to string for database storage
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Trainer => "trainer",
            Self::Admin => "admin",
        }
    }

    /// Admins may read and moderate every document
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Roles a visitor may pick on the registration form
    #[must_use]
    pub const fn is_self_registrable(self) -> bool {
        matches!(self, Self::Client | Self::Trainer)
    }
}

impl Display for UserRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(Self::Client),
            "trainer" => Ok(Self::Trainer),
            "admin" => Ok(Self::Admin),
            _ => Err(AppError::invalid_input(format!("Invalid user role: {s}"))),
        }
    }
}
