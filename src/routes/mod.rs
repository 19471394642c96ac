// ABOUTME: Route module organization for the FitCoach HTTP API
// ABOUTME: Groups route definitions by domain and shares authentication and parsing helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! Route module for the FitCoach server
//!
//! Each domain module exposes a `*Routes` struct whose `routes` function
//! returns an axum `Router` with `Arc<ServerResources>` as state. Handlers
//! stay thin: authenticate, guard the role, call the database or a service.

/// Admin moderation routes
pub mod admin;
/// Registration, login and password management
pub mod auth;
/// Calendar and progress aggregation
pub mod calendar;
/// Trainer change requests
pub mod change_requests;
/// Chat REST routes
pub mod chat;
/// Health check route
pub mod health;
/// Workout log routes
pub mod logs;
/// Notification routes
pub mod notifications;
/// Workout plan and day status routes
pub mod plans;
/// Workout template routes
pub mod templates;
/// Trainer directory and matching routes
pub mod trainers;
/// User profile routes
pub mod users;
/// WebSocket upgrade route
pub mod websocket;

pub use admin::AdminRoutes;
pub use auth::AuthRoutes;
pub use calendar::CalendarRoutes;
pub use change_requests::ChangeRequestRoutes;
pub use chat::ChatRoutes;
pub use health::HealthRoutes;
pub use logs::LogRoutes;
pub use notifications::NotificationRoutes;
pub use plans::PlanRoutes;
pub use templates::TemplateRoutes;
pub use trainers::TrainerRoutes;
pub use users::UserRoutes;
pub use websocket::WebSocketRoutes;

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use chrono::NaiveDate;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::auth::AuthResult;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::resources::ServerResources;

/// Authenticate a request from its cookie or Authorization header
pub(crate) async fn authenticate(
    headers: &HeaderMap,
    resources: &ServerResources,
) -> AppResult<AuthResult> {
    resources
        .auth_middleware
        .authenticate_request_with_headers(headers)
        .await
}

/// Parse an id taken from the URL path
pub(crate) fn parse_id(value: &str, what: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value).map_err(|_| AppError::invalid_format(format!("Invalid {what} id")))
}

/// Parse a `YYYY-MM-DD` date
pub(crate) fn parse_date(value: &str, field: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        AppError::invalid_format(format!("Field '{field}' must be a date in YYYY-MM-DD format"))
    })
}

/// JSON body that may be left out entirely.
///
/// An empty body yields `None`. A body that is present must be valid JSON
/// for `T`, otherwise the request fails with `INVALID_FORMAT`.
#[derive(Debug)]
pub struct OptionalJson<T>(pub Option<T>);

impl<T> OptionalJson<T> {
    /// The body, or `T::default()` when it was left out
    pub fn unwrap_or_default(self) -> T
    where
        T: Default,
    {
        self.0.unwrap_or_default()
    }
}

#[async_trait]
impl<T, S> FromRequest<S> for OptionalJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                AppError::new(ErrorCode::PayloadTooLarge, rejection.body_text())
            } else {
                AppError::invalid_input(rejection.body_text())
            }
        })?;
        parse_optional_json(&bytes).map(Self)
    }
}

fn parse_optional_json<T: DeserializeOwned>(bytes: &[u8]) -> AppResult<Option<T>> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(bytes)
        .map(Some)
        .map_err(|e| AppError::invalid_format(format!("Invalid JSON body: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2025-03-09", "date").unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 9).unwrap()
        );
        assert!(parse_date("09/03/2025", "date").is_err());
        assert!(parse_date("2025-02-30", "date").is_err());
    }

    #[derive(Debug, serde::Deserialize)]
    struct Reason {
        reason: Option<String>,
    }

    #[test]
    fn test_optional_json_body() {
        assert!(parse_optional_json::<Reason>(b"").unwrap().is_none());
        assert!(parse_optional_json::<Reason>(b"  \n").unwrap().is_none());
        let parsed = parse_optional_json::<Reason>(br#"{"reason":"sick"}"#).unwrap().unwrap();
        assert_eq!(parsed.reason.as_deref(), Some("sick"));

        let err = parse_optional_json::<Reason>(br#"{"reason":5}"#).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFormat);
        assert!(parse_optional_json::<Reason>(b"{not json").is_err());
    }

    #[test]
    fn test_parse_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string(), "plan").unwrap(), id);
        assert_eq!(
            parse_id("nope", "plan").unwrap_err().message,
            "Invalid plan id"
        );
    }
}
