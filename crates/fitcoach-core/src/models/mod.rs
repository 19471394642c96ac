// ABOUTME: Core data models for the FitCoach platform
// ABOUTME: Re-exports users, workouts, change requests, notifications, chat and progress types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! # Data Models
//!
//! Every document the server stores, plus the projections the REST API
//! returns. Storage lives in the server crate; these types carry no I/O.

mod change_request;
mod chat;
mod notification;
mod progress;
mod user;
mod workout;

pub use change_request::{ChangeTrainerRequest, RequestStatus};
pub use chat::{Chat, ChatParticipant, ChatSummary, Message, MAX_MESSAGE_CHARS};
pub use notification::{NewNotification, Notification, NotificationKind};
pub use progress::{
    calendar_month, month_bounds, parse_month, week_bounds, CalendarDay, CalendarDayStatus,
    CompletionWindow, ProgressSummary,
};
pub use user::{ProfileDetails, TrainerStatus, TrainerSummary, User, UserProfile, UserStatus};
pub use workout::{DayStatus, Exercise, PlanDay, WorkoutLog, WorkoutPlan, WorkoutTemplate};
