// ABOUTME: Core types for the FitCoach personal training platform
// ABOUTME: Foundation crate with error handling, roles and domain models
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

#![deny(unsafe_code)]

//! # FitCoach Core
//!
//! Foundation crate providing the shared types of the FitCoach server. It is
//! designed to change infrequently so the server crate benefits from
//! incremental compilation.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **permissions**: User roles and the role hierarchy
//! - **models**: Users, workout plans, templates, logs, change requests,
//!   notifications and chat documents

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Core data models (users, plans, templates, chat, notifications)
pub mod models;

/// Role-based permission model (`client`, `trainer`, `admin`)
pub mod permissions;
