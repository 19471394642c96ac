// ABOUTME: Outgoing email abstraction used for password reset links
// ABOUTME: Ships a logging mailer and an in-memory recording mailer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use crate::errors::AppResult;

/// A single outgoing email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    /// Recipient address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// Plain text body
    pub body: String,
}

impl OutgoingEmail {
    /// Password reset email containing the reset link
    #[must_use]
    pub fn password_reset(to: &str, name: &str, reset_link: &str, ttl_minutes: i64) -> Self {
        Self {
            to: to.to_owned(),
            subject: "Reset your FitCoach password".to_owned(),
            body: format!(
                "Hi {name},\n\nUse the link below to choose a new password. \
                 It expires in {ttl_minutes} minutes.\n\n{reset_link}\n\n\
                 If you did not ask for a reset you can ignore this email."
            ),
        }
    }
}

/// Email delivery backend
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver an email
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the message
    async fn send(&self, email: OutgoingEmail) -> AppResult<()>;
}

/// Writes emails to the log instead of delivering them
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: OutgoingEmail) -> AppResult<()> {
        info!(
            mail.to = %email.to,
            mail.subject = %email.subject,
            mail.body = %email.body,
            "Outgoing email"
        );
        Ok(())
    }
}

/// Keeps every email in memory so callers can inspect what was sent
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl RecordingMailer {
    /// Create an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emails sent so far, oldest first
    pub async fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> AppResult<()> {
        self.sent.lock().await.push(email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_mailer_keeps_messages() {
        let mailer = RecordingMailer::new();
        mailer
            .send(OutgoingEmail::password_reset(
                "client@example.com",
                "Client",
                "http://localhost:3000/reset-password?token=abc",
                60,
            ))
            .await
            .unwrap();

        let sent = mailer.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "client@example.com");
        assert!(sent[0].body.contains("token=abc"));
        assert!(sent[0].body.contains("60 minutes"));
    }
}
