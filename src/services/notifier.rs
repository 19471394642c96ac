// ABOUTME: Best-effort notification writer shared by every route that notifies users
// ABOUTME: Storage failures are logged and never fail the operation that triggered them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use std::sync::Arc;

use tracing::warn;

use crate::database::Database;
use fitcoach_core::models::{NewNotification, Notification};

/// Writes notifications on behalf of domain operations
#[derive(Clone)]
pub struct Notifier {
    database: Arc<Database>,
}

impl Notifier {
    /// Create a notifier over the shared database
    #[must_use]
    pub const fn new(database: Arc<Database>) -> Self {
        Self { database }
    }

    /// Store a notification, returning `None` if storage failed
    pub async fn notify(&self, input: NewNotification) -> Option<Notification> {
        match self.database.create_notification(&input).await {
            Ok(notification) => Some(notification),
            Err(e) => {
                warn!(
                    user_id = %input.user_id,
                    kind = input.kind.as_str(),
                    error = %e,
                    "Failed to store notification"
                );
                None
            }
        }
    }

    /// Store several notifications independently
    pub async fn notify_all(&self, inputs: impl IntoIterator<Item = NewNotification>) {
        for input in inputs {
            self.notify(input).await;
        }
    }
}
