// ABOUTME: System-wide constants and defaults for the FitCoach server
// ABOUTME: Groups service names, limits, environment defaults and time values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! # Constants Module
//!
//! Hardcoded values and environment defaults shared across modules.

/// Service identification
pub mod service_names {
    /// Name reported in logs and the health endpoint
    pub const FITCOACH_SERVER: &str = "fitcoach-server";

    /// Server version from Cargo.toml
    pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
}

/// Defaults applied when an environment variable is absent
pub mod defaults {
    /// HTTP listen port
    pub const HTTP_PORT: u16 = 8081;

    /// Bind address
    pub const HOST: &str = "0.0.0.0";

    /// SQLite database location
    pub const DATABASE_URL: &str = "sqlite:./data/fitcoach.db";

    /// JWT lifetime
    pub const JWT_EXPIRY_HOURS: i64 = 24;

    /// bcrypt work factor
    pub const BCRYPT_COST: u32 = 12;

    /// Password reset token lifetime
    pub const PASSWORD_RESET_TTL_MINUTES: i64 = 60;

    /// Base URL of the web client, used for reset links
    pub const FRONTEND_URL: &str = "http://localhost:3000";

    /// Largest accepted photo after base64 decoding (5 MiB)
    pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

    /// Seconds before an in-flight request is aborted
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
}

/// Authentication constants
pub mod auth {
    /// JWT audience claim
    pub const JWT_AUDIENCE: &str = "fitcoach";

    /// JWT issuer claim
    pub const JWT_ISSUER: &str = "fitcoach-server";

    /// Cookie carrying the JWT for browser clients
    pub const AUTH_COOKIE_NAME: &str = "auth_token";

    /// Shortest accepted password
    pub const MIN_PASSWORD_LENGTH: usize = 8;

    /// Random bytes in a password reset token
    pub const RESET_TOKEN_BYTES: usize = 32;
}

/// List and payload limits
pub mod limits {
    /// Page size when `limit` is omitted
    pub const DEFAULT_PAGE_SIZE: i64 = 50;

    /// Largest accepted page size
    pub const MAX_PAGE_SIZE: i64 = 100;

    /// Buffered events per chat room before slow receivers lag
    pub const CHAT_ROOM_CAPACITY: usize = 64;

    /// Longest accepted free-text field (reasons, notes, bios)
    pub const MAX_TEXT_LENGTH: usize = 2000;

    /// Clamp a requested page size into `1..=MAX_PAGE_SIZE`
    #[must_use]
    pub fn clamp_page_size(limit: Option<i64>) -> i64 {
        limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::limits::clamp_page_size;

    #[test]
    fn test_clamp_page_size() {
        assert_eq!(clamp_page_size(None), 50);
        assert_eq!(clamp_page_size(Some(0)), 1);
        assert_eq!(clamp_page_size(Some(-4)), 1);
        assert_eq!(clamp_page_size(Some(20)), 20);
        assert_eq!(clamp_page_size(Some(1000)), 100);
    }
}
