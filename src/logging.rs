// ABOUTME: Tracing subscriber setup and structured event helpers for the FitCoach server
// ABOUTME: Reads RUST_LOG and LOG_FORMAT, clamps chatty dependencies and tags events with service metadata
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! Logging setup
//!
//! Everything goes through `tracing`. Production defaults to JSON lines
//! with source locations; other environments default to the human readable
//! formatter. `LOG_FORMAT` overrides either.

use std::env;
use std::io;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use tracing::{info, warn};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::Environment;
use crate::constants::service_names;

/// Dependency targets that are too verbose at `info`
const QUIET_TARGETS: &[&str] = &[
    "hyper=warn",
    "sqlx=warn",
    "tower_http=info",
    "tungstenite=warn",
    "tokio_tungstenite=warn",
];

/// Output format of the fmt layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event
    Json,
    /// Full human readable output with targets
    #[default]
    Pretty,
    /// Single-line human readable output
    Compact,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => Err(anyhow!("Unknown LOG_FORMAT '{other}' (expected json, pretty or compact)")),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, e.g. `info` or `fitcoach_server=debug`
    pub directives: String,
    /// Output format
    pub format: LogFormat,
    /// Emit file and line for every event
    pub with_location: bool,
    /// Emit span open/close events
    pub with_span_events: bool,
    /// Deployment environment
    pub environment: Environment,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directives: "info".to_owned(),
            format: LogFormat::default(),
            with_location: false,
            with_span_events: false,
            environment: Environment::default(),
        }
    }
}

impl LoggingConfig {
    /// Read the logging variables from the process environment
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown `LOG_FORMAT`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the logging variables through an arbitrary lookup
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown `LOG_FORMAT`
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .map_or_else(Environment::default, |v| Environment::from_str_or_default(&v));
        let format = match lookup("LOG_FORMAT") {
            Some(raw) => raw.parse()?,
            None if environment.is_production() => LogFormat::Json,
            None => LogFormat::Pretty,
        };

        Ok(Self {
            directives: lookup("RUST_LOG")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| "info".to_owned()),
            format,
            with_location: environment.is_production() || lookup("LOG_INCLUDE_LOCATION").is_some(),
            with_span_events: lookup("LOG_INCLUDE_SPANS").is_some(),
            environment,
        })
    }

    /// Configured directives followed by the dependency clamps
    #[must_use]
    pub fn env_filter(&self) -> EnvFilter {
        QUIET_TARGETS
            .iter()
            .filter_map(|directive| directive.parse().ok())
            .fold(EnvFilter::new(&self.directives), EnvFilter::add_directive)
    }

    /// Install the global subscriber
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed
    pub fn init(&self) -> Result<()> {
        let registry = tracing_subscriber::registry().with(self.env_filter());
        let spans = if self.with_span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };
        let layer = fmt::layer()
            .with_writer(io::stdout)
            .with_file(self.with_location)
            .with_line_number(self.with_location)
            .with_span_events(spans);

        match self.format {
            LogFormat::Json => registry.with(layer.json()).try_init()?,
            LogFormat::Pretty => registry.with(layer).try_init()?,
            LogFormat::Compact => registry.with(layer.compact().with_target(false)).try_init()?,
        }

        info!(
            service.name = service_names::FITCOACH_SERVER,
            service.version = service_names::SERVER_VERSION,
            environment = %self.environment,
            log.filter = %self.directives,
            log.format = ?self.format,
            "Logging initialized"
        );
        Ok(())
    }
}

/// Initialize logging from environment
///
/// # Errors
///
/// Returns an error if the variables are invalid or logging is already set up
pub fn init_from_env() -> Result<()> {
    LoggingConfig::from_env()?.init()
}

/// Structured events with stable field names, so log queries can filter on them
pub struct AppLogger;

impl AppLogger {
    /// Registration, login and password events; `subject` is a user id or the attempted email
    pub fn log_auth_event(subject: &str, event: &str, success: bool, details: Option<&str>) {
        if success {
            info!(auth.subject = %subject, auth.event = %event, auth.details = details.unwrap_or(""), "Auth event");
        } else {
            warn!(auth.subject = %subject, auth.event = %event, auth.details = details.unwrap_or(""), "Auth event failed");
        }
    }

    /// Refused tokens, suspensions and deletions
    pub fn log_security_event(
        event_type: &str,
        severity: &str,
        details: &str,
        user_id: Option<&str>,
    ) {
        warn!(
            security.event = %event_type,
            security.severity = %severity,
            security.details = %details,
            user.id = user_id.unwrap_or("unknown"),
            "Security event"
        );
    }

    /// A state change on a plan, day, request or account
    pub fn log_domain_event(entity: &str, entity_id: &str, event: &str, actor_id: &str) {
        info!(
            domain.entity = %entity,
            domain.id = %entity_id,
            domain.event = %event,
            actor.id = %actor_id,
            "Domain event"
        );
    }

    /// Timing of a storage maintenance step such as migrations
    pub fn log_database_operation(operation: &str, table: &str, success: bool, duration_ms: u64) {
        info!(
            db.operation = %operation,
            db.table = %table,
            db.success = success,
            db.duration_ms = duration_ms,
            "Database operation"
        );
    }
}
