// ABOUTME: Server-side access to the unified error types from fitcoach-core
// ABOUTME: Route handlers return AppError which renders as a JSON error body
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! Re-exports of the shared error types so server modules can write
//! `crate::errors::AppError` without naming the core crate.

pub use fitcoach_core::errors::{
    AppError, AppResult, ErrorCode, ErrorResponse, ErrorResponseDetails,
};
