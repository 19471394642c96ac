// ABOUTME: One-to-one chat and message documents between platform users
// ABOUTME: Chats store their participants in sorted order so each pair maps to one chat
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult, ErrorCode};
use crate::permissions::UserRole;

/// Longest accepted message body, in characters
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// Conversation between exactly two users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    /// Chat id
    pub id: Uuid,
    /// Lower of the two participant ids
    pub participant_a: Uuid,
    /// Higher of the two participant ids
    pub participant_b: Uuid,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Time of the latest message
    pub last_message_at: Option<DateTime<Utc>>,
}

impl Chat {
    /// Order a participant pair canonically
    #[must_use]
    pub fn ordered_pair(first: Uuid, second: Uuid) -> (Uuid, Uuid) {
        if first <= second {
            (first, second)
        } else {
            (second, first)
        }
    }

    /// Whether the user takes part in this chat
    #[must_use]
    pub fn has_participant(&self, user_id: Uuid) -> bool {
        self.participant_a == user_id || self.participant_b == user_id
    }

    /// The participant that is not `user_id`
    #[must_use]
    pub fn other_participant(&self, user_id: Uuid) -> Uuid {
        if self.participant_a == user_id {
            self.participant_b
        } else {
            self.participant_a
        }
    }
}

/// Persisted chat message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Message id
    pub id: Uuid,
    /// Chat the message belongs to
    pub chat_id: Uuid,
    /// Author
    pub sender_id: Uuid,
    /// Body text
    pub content: String,
    /// Read by the recipient
    pub is_read: bool,
    /// Send time
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Trim and validate a message body
    ///
    /// # Errors
    ///
    /// Returns an error for empty bodies or bodies over [`MAX_MESSAGE_CHARS`]
    pub fn normalize_content(content: &str) -> AppResult<String> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(AppError::missing_field("content"));
        }
        if trimmed.chars().count() > MAX_MESSAGE_CHARS {
            return Err(AppError::new(
                ErrorCode::ValueOutOfRange,
                format!("Message exceeds {MAX_MESSAGE_CHARS} characters"),
            ));
        }
        Ok(trimmed.to_owned())
    }
}

/// Minimal description of the other chat participant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatParticipant {
    /// User id
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Role
    pub role: UserRole,
    /// Profile photo
    pub profile_photo: Option<String>,
}

/// Chat list entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSummary {
    /// Chat id
    pub id: Uuid,
    /// The other participant
    pub participant: ChatParticipant,
    /// Latest message
    pub last_message: Option<Message>,
    /// Messages from the other participant not yet read
    pub unread_count: i64,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordered_pair_is_symmetric() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(Chat::ordered_pair(a, b), Chat::ordered_pair(b, a));
    }

    #[test]
    fn test_normalize_content() {
        assert_eq!(Message::normalize_content("  hi  ").unwrap(), "hi");
        assert!(Message::normalize_content("   ").is_err());
        let long = "x".repeat(MAX_MESSAGE_CHARS + 1);
        assert!(Message::normalize_content(&long).is_err());
    }
}
