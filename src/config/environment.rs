// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses ports, database URL, JWT, CORS, photo limits and reset settings from env vars
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! Environment-based configuration management for production deployment

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::defaults;

/// Environment type for security and other configurations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `sqlite:` URL, `sqlite::memory:` for an in-process database
    pub url: String,
}

impl DatabaseConfig {
    /// Whether the URL points at an in-memory database
    #[must_use]
    pub fn is_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

/// Authentication settings
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 signing secret
    pub jwt_secret: String,
    /// Token lifetime
    pub jwt_expiry_hours: i64,
    /// bcrypt work factor
    pub bcrypt_cost: u32,
    /// Password reset token lifetime
    pub password_reset_ttl_minutes: i64,
}

/// CORS settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated origins, or `*`
    pub allowed_origins: String,
}

/// Payload limits
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Largest accepted photo after base64 decoding
    pub max_photo_bytes: usize,
    /// Seconds before an in-flight request is aborted
    pub request_timeout_secs: u64,
}

impl LimitsConfig {
    /// Request body limit large enough for one base64 photo plus the JSON around it
    #[must_use]
    pub const fn request_body_limit(&self) -> usize {
        self.max_photo_bytes / 3 * 4 + 64 * 1024
    }
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// Bind address
    pub host: String,
    /// Deployment environment
    pub environment: Environment,
    /// Database settings
    pub database: DatabaseConfig,
    /// Authentication settings
    pub auth: AuthConfig,
    /// CORS settings
    pub cors: CorsConfig,
    /// Payload limits
    pub limits: LimitsConfig,
    /// Base URL of the web client
    pub frontend_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: defaults::HTTP_PORT,
            host: defaults::HOST.to_owned(),
            environment: Environment::Development,
            database: DatabaseConfig {
                url: defaults::DATABASE_URL.to_owned(),
            },
            auth: AuthConfig {
                jwt_secret: generate_secret(),
                jwt_expiry_hours: defaults::JWT_EXPIRY_HOURS,
                bcrypt_cost: defaults::BCRYPT_COST,
                password_reset_ttl_minutes: defaults::PASSWORD_RESET_TTL_MINUTES,
            },
            cors: CorsConfig {
                allowed_origins: "*".to_owned(),
            },
            limits: LimitsConfig {
                max_photo_bytes: defaults::MAX_PHOTO_BYTES,
                request_timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
            },
            frontend_url: defaults::FRONTEND_URL.to_owned(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable has an invalid value, or if `JWT_SECRET`
    /// is missing in production
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Same as [`ServerConfig::from_env`]
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .map_or_else(Environment::default, |v| Environment::from_str_or_default(&v));

        let jwt_secret = match lookup("JWT_SECRET").filter(|s| !s.trim().is_empty()) {
            Some(secret) => secret,
            None if environment.is_production() => {
                return Err(anyhow!("JWT_SECRET must be set in production"));
            }
            None => {
                warn!("JWT_SECRET not set, generated an ephemeral secret; tokens will not survive a restart");
                generate_secret()
            }
        };

        let config = Self {
            http_port: parse_or(&lookup, "HTTP_PORT", defaults::HTTP_PORT)?,
            host: lookup("HOST").unwrap_or_else(|| defaults::HOST.to_owned()),
            environment,
            database: DatabaseConfig {
                url: lookup("DATABASE_URL").unwrap_or_else(|| defaults::DATABASE_URL.to_owned()),
            },
            auth: AuthConfig {
                jwt_secret,
                jwt_expiry_hours: parse_or(&lookup, "JWT_EXPIRY_HOURS", defaults::JWT_EXPIRY_HOURS)?,
                bcrypt_cost: parse_or(&lookup, "BCRYPT_COST", defaults::BCRYPT_COST)?,
                password_reset_ttl_minutes: parse_or(
                    &lookup,
                    "PASSWORD_RESET_TTL_MINUTES",
                    defaults::PASSWORD_RESET_TTL_MINUTES,
                )?,
            },
            cors: CorsConfig {
                allowed_origins: lookup("CORS_ALLOWED_ORIGINS").unwrap_or_else(|| "*".to_owned()),
            },
            limits: LimitsConfig {
                max_photo_bytes: parse_or(&lookup, "MAX_PHOTO_BYTES", defaults::MAX_PHOTO_BYTES)?,
                request_timeout_secs: parse_or(
                    &lookup,
                    "REQUEST_TIMEOUT_SECS",
                    defaults::REQUEST_TIMEOUT_SECS,
                )?,
            },
            frontend_url: lookup("FRONTEND_URL")
                .unwrap_or_else(|| defaults::FRONTEND_URL.to_owned()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_expiry_hours <= 0 {
            return Err(anyhow!("JWT_EXPIRY_HOURS must be positive"));
        }
        if !(4..=31).contains(&self.auth.bcrypt_cost) {
            return Err(anyhow!("BCRYPT_COST must be between 4 and 31"));
        }
        if self.auth.password_reset_ttl_minutes <= 0 {
            return Err(anyhow!("PASSWORD_RESET_TTL_MINUTES must be positive"));
        }
        if self.limits.max_photo_bytes == 0 {
            return Err(anyhow!("MAX_PHOTO_BYTES must be positive"));
        }
        if self.environment.is_production() && self.auth.jwt_secret.len() < 32 {
            return Err(anyhow!("JWT_SECRET must be at least 32 characters in production"));
        }
        Ok(())
    }

    /// Log-safe one-line summary (never includes secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "environment={} bind={}:{} database={} jwt_expiry_hours={} cors={} max_photo_bytes={} frontend_url={}",
            self.environment,
            self.host,
            self.http_port,
            redact_database_url(&self.database.url),
            self.auth.jwt_expiry_hours,
            self.cors.allowed_origins,
            self.limits.max_photo_bytes,
            self.frontend_url,
        )
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {key}: '{raw}'")),
        None => Ok(default),
    }
}

fn redact_database_url(url: &str) -> String {
    // Strip query parameters, which may carry credentials for other drivers
    url.split('?').next().unwrap_or(url).to_owned()
}

fn generate_secret() -> String {
    let mut bytes = [0u8; 64];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
