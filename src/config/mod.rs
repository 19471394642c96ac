// ABOUTME: Configuration module for the FitCoach server
// ABOUTME: Configuration is read from environment variables only
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

/// Environment-based server configuration
pub mod environment;

pub use environment::{
    AuthConfig, CorsConfig, DatabaseConfig, Environment, LimitsConfig, ServerConfig,
};
