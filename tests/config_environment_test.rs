// ABOUTME: Integration tests for loading server configuration from process environment variables
// ABOUTME: Serialized because they mutate the shared process environment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::env;

use fitcoach_server::config::{Environment, ServerConfig};
use serial_test::serial;

const KEYS: [&str; 6] = [
    "ENVIRONMENT",
    "HTTP_PORT",
    "DATABASE_URL",
    "JWT_SECRET",
    "MAX_PHOTO_BYTES",
    "BCRYPT_COST",
];

fn clear_env() {
    for key in KEYS {
        env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_from_env_reads_overrides() {
    clear_env();
    env::set_var("HTTP_PORT", "9090");
    env::set_var("DATABASE_URL", "sqlite::memory:");
    env::set_var("JWT_SECRET", "env-secret");
    env::set_var("MAX_PHOTO_BYTES", "2048");

    let config = ServerConfig::from_env().unwrap();
    assert_eq!(config.http_port, 9090);
    assert!(config.database.is_memory());
    assert_eq!(config.auth.jwt_secret, "env-secret");
    assert_eq!(config.limits.max_photo_bytes, 2048);
    assert_eq!(config.environment, Environment::Development);

    clear_env();
}

#[test]
#[serial]
fn test_from_env_refuses_production_without_secret() {
    clear_env();
    env::set_var("ENVIRONMENT", "production");

    let err = ServerConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("JWT_SECRET"));

    clear_env();
}

#[test]
#[serial]
fn test_from_env_rejects_out_of_range_bcrypt_cost() {
    clear_env();
    env::set_var("BCRYPT_COST", "2");

    let err = ServerConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("BCRYPT_COST"));

    clear_env();
}
