// ABOUTME: HTTP middleware for request tracing, authentication and role guards
// ABOUTME: Provides request ID generation, span creation, CORS and JWT authentication
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

pub mod admin_guard;
pub mod auth;
pub mod cors;
pub mod tracing;

// Authentication middleware
pub use auth::AuthMiddleware;

// Role guards
pub use admin_guard::{
    load_user, require_admin, require_approved_trainer, require_client, require_role,
};

// CORS configuration
pub use cors::setup_cors;

// Request tracing
pub use self::tracing::{MakeRequestUuid, RecordResponse, RequestSpan, REQUEST_ID_HEADER};
