// ABOUTME: Domain service layer for business logic extracted from route handlers
// ABOUTME: Provides protocol-agnostic services reusable across REST and WebSocket entry points
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! Domain service layer
//!
//! Business rules that more than one entry point needs live here, so a chat
//! message sent over REST and one sent over the WebSocket go through the same
//! checks.

/// Who may see a client's plans, logs, calendar and profile
pub mod access;

/// Chat permissions, message posting and chat list aggregation
pub mod messaging;

/// Best-effort notification delivery
pub mod notifier;

/// Completing and failing plan days
pub mod workout_days;
