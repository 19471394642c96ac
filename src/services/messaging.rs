// ABOUTME: Chat rules shared by the REST chat routes and the WebSocket handler
// ABOUTME: Who may talk to whom, posting a message and building the chat list
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use uuid::Uuid;

use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::websocket::{ChatEvent, ChatHub};
use fitcoach_core::models::{Chat, ChatParticipant, ChatSummary, Message, User};

/// Check that two users may have a conversation.
///
/// Allowed pairs are a client with their assigned trainer, and an admin with
/// anyone.
///
/// # Errors
///
/// Returns `INVALID_INPUT` for a chat with oneself and `PERMISSION_DENIED`
/// for any other pair
pub fn ensure_can_chat(user: &User, other: &User) -> AppResult<()> {
    if user.id == other.id {
        return Err(AppError::invalid_input("Cannot start a chat with yourself"));
    }
    if user.role.is_admin() || other.role.is_admin() || user.coaches(other) || other.coaches(user)
    {
        return Ok(());
    }
    Err(AppError::permission_denied(
        "Chats are limited to a client and their trainer, or an admin",
    ))
}

/// Get or create the chat between `user` and `participant_id`
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` for an unknown participant, or the
/// [`ensure_can_chat`] errors
pub async fn open_chat(database: &Database, user: &User, participant_id: Uuid) -> AppResult<Chat> {
    let other = database
        .get_user(participant_id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    ensure_can_chat(user, &other)?;
    database.get_or_create_chat(user.id, other.id).await
}

/// Load a chat the user takes part in
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` for unknown chats and `PERMISSION_DENIED`
/// when the user is not a participant
pub async fn chat_for_participant(
    database: &Database,
    chat_id: Uuid,
    user_id: Uuid,
) -> AppResult<Chat> {
    let chat = database
        .get_chat(chat_id)
        .await?
        .ok_or_else(|| AppError::not_found("Chat"))?;
    if !chat.has_participant(user_id) {
        return Err(AppError::permission_denied(
            "You are not a participant of this chat",
        ));
    }
    Ok(chat)
}

/// Persist a message and emit it to everyone joined to the chat room.
///
/// The pairing rule is checked again on every post, so a client's former
/// trainer can still read the history but can no longer write.
///
/// # Errors
///
/// Returns validation errors for the content, the [`chat_for_participant`]
/// errors, or `PERMISSION_DENIED` when the pair may no longer chat
pub async fn post_message(
    database: &Database,
    hub: &ChatHub,
    chat_id: Uuid,
    sender_id: Uuid,
    content: &str,
) -> AppResult<Message> {
    let content = Message::normalize_content(content)?;
    let chat = chat_for_participant(database, chat_id, sender_id).await?;
    let sender = database
        .get_user(sender_id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    let other = database
        .get_user(chat.other_participant(sender_id))
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    ensure_can_chat(&sender, &other)?;

    let message = database.create_message(chat_id, sender_id, &content).await?;
    let delivered = hub.publish(chat_id, ChatEvent::Message(message.clone()));
    tracing::debug!(chat_id = %chat_id, delivered, "Chat message published");
    Ok(message)
}

/// Chat list for a user with the other participant, last message and unread count
///
/// # Errors
///
/// Returns an error if a query fails
pub async fn chat_summaries(database: &Database, user_id: Uuid) -> AppResult<Vec<ChatSummary>> {
    let chats = database.list_chats(user_id).await?;
    let mut summaries = Vec::with_capacity(chats.len());

    for chat in chats {
        let Some(other) = database.get_user(chat.other_participant(user_id)).await? else {
            continue;
        };
        summaries.push(ChatSummary {
            id: chat.id,
            participant: ChatParticipant {
                id: other.id,
                name: other.name,
                role: other.role,
                profile_photo: other.profile.profile_photo,
            },
            last_message: database.last_message(chat.id).await?,
            unread_count: database.unread_count_in_chat(chat.id, user_id).await?,
            created_at: chat.created_at,
        });
    }
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitcoach_core::models::TrainerStatus;
    use fitcoach_core::permissions::UserRole;

    fn user(role: UserRole) -> User {
        let mut user = User::new("u@example.com", "h".into(), "U".into(), role);
        if role == UserRole::Trainer {
            user.trainer_status = TrainerStatus::Approved;
        }
        user
    }

    #[test]
    fn test_client_and_assigned_trainer_may_chat() {
        let trainer = user(UserRole::Trainer);
        let mut client = user(UserRole::Client);
        assert!(ensure_can_chat(&client, &trainer).is_err());

        client.trainer_id = Some(trainer.id);
        assert!(ensure_can_chat(&client, &trainer).is_ok());
        assert!(ensure_can_chat(&trainer, &client).is_ok());
    }

    #[test]
    fn test_admin_may_chat_with_anyone_but_not_self() {
        let admin = user(UserRole::Admin);
        let client = user(UserRole::Client);
        assert!(ensure_can_chat(&admin, &client).is_ok());
        assert!(ensure_can_chat(&client, &admin).is_ok());
        assert!(ensure_can_chat(&admin, &admin).is_err());
    }

    #[test]
    fn test_two_clients_may_not_chat() {
        let a = user(UserRole::Client);
        let b = user(UserRole::Client);
        assert_eq!(
            ensure_can_chat(&a, &b).unwrap_err().code,
            crate::errors::ErrorCode::PermissionDenied
        );
    }
}
