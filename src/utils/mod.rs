// ABOUTME: Utility modules for common functionality across the application
// ABOUTME: Contains cookie parsing, input validation and photo checks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

/// Cookie header parsing
pub mod cookies;
/// Base64 photo validation
pub mod photo;
/// Email, password and free-text validation
pub mod validation;
