// ABOUTME: Aggregate counts for the admin dashboard
// ABOUTME: Users by role, pending reviews and workout volume
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use serde::{Deserialize, Serialize};

use super::Database;
use crate::errors::AppResult;

/// Platform-wide counters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminStats {
    /// All accounts
    pub total_users: i64,
    /// Client accounts
    pub clients: i64,
    /// Trainer accounts, any application state
    pub trainers: i64,
    /// Admin accounts
    pub admins: i64,
    /// Suspended accounts
    pub suspended_users: i64,
    /// Trainers awaiting review
    pub pending_trainer_applications: i64,
    /// Change requests awaiting a decision
    pub pending_change_requests: i64,
    /// Workout plans
    pub total_plans: i64,
    /// Workout logs
    pub total_logs: i64,
}

impl Database {
    /// Collect dashboard counters
    ///
    /// # Errors
    ///
    /// Returns an error if any count query fails
    pub async fn admin_stats(&self) -> AppResult<AdminStats> {
        let (total_users, clients, trainers, admins, suspended_users, pending_trainer_applications): (
            i64,
            i64,
            i64,
            i64,
            i64,
            i64,
        ) = sqlx::query_as(
            r"
            SELECT COUNT(*),
                   COALESCE(SUM(role = 'client'), 0),
                   COALESCE(SUM(role = 'trainer'), 0),
                   COALESCE(SUM(role = 'admin'), 0),
                   COALESCE(SUM(status = 'suspended'), 0),
                   COALESCE(SUM(role = 'trainer' AND trainer_status = 'pending'), 0)
            FROM users
            ",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(AdminStats {
            total_users,
            clients,
            trainers,
            admins,
            suspended_users,
            pending_trainer_applications,
            pending_change_requests: self.count_pending_change_requests().await?,
            total_plans: self.count_plans().await?,
            total_logs: self.count_logs().await?,
        })
    }
}
