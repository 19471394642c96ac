// ABOUTME: Request authentication from the auth cookie or a Bearer token
// ABOUTME: Validates the JWT and reloads the user so suspensions take effect immediately
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use std::sync::Arc;

use http::{header::AUTHORIZATION, HeaderMap};
use uuid::Uuid;

use crate::auth::{AuthManager, AuthResult};
use crate::constants::auth::AUTH_COOKIE_NAME;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::utils::cookies::get_cookie_value;

/// Middleware shared by every authenticated route and the WebSocket handshake
#[derive(Clone)]
pub struct AuthMiddleware {
    auth_manager: Arc<AuthManager>,
    database: Arc<Database>,
}

impl AuthMiddleware {
    /// Create new auth middleware
    #[must_use]
    pub const fn new(auth_manager: Arc<AuthManager>, database: Arc<Database>) -> Self {
        Self {
            auth_manager,
            database,
        }
    }

    /// Authenticate request using headers (supports cookies and Authorization header)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No cookie and no Authorization header are present
    /// - JWT token validation fails
    /// - The user no longer exists or is suspended
    #[tracing::instrument(
        skip(self, headers),
        fields(
            auth_method = tracing::field::Empty,
            user_id = tracing::field::Empty,
            success = tracing::field::Empty,
        )
    )]
    pub async fn authenticate_request_with_headers(
        &self,
        headers: &HeaderMap,
    ) -> AppResult<AuthResult> {
        // Cookie first for browser clients
        if let Some(token) = get_cookie_value(headers, AUTH_COOKIE_NAME) {
            tracing::Span::current().record("auth_method", "JWT_COOKIE");
            return Self::record_outcome(self.authenticate_token(&token).await);
        }

        let auth_header = headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok());
        self.authenticate_request(auth_header).await
    }

    /// Authenticate a raw `Authorization` header value
    ///
    /// # Errors
    ///
    /// Returns `AUTH_REQUIRED` when the header is missing, `AUTH_INVALID` for
    /// anything that is not a valid Bearer token
    pub async fn authenticate_request(&self, auth_header: Option<&str>) -> AppResult<AuthResult> {
        let Some(header) = auth_header else {
            tracing::debug!("Authentication failed: missing authorization header");
            return Err(AppError::auth_required());
        };

        let Some(token) = header.strip_prefix("Bearer ") else {
            tracing::Span::current()
                .record("auth_method", "INVALID")
                .record("success", false);
            return Err(AppError::auth_invalid(
                "Invalid authorization header format - must be 'Bearer <token>'",
            ));
        };

        tracing::Span::current().record("auth_method", "JWT_TOKEN");
        Self::record_outcome(self.authenticate_token(token.trim()).await)
    }

    /// Validate a bare JWT and load its user
    ///
    /// # Errors
    ///
    /// - `AUTH_EXPIRED` or `AUTH_INVALID` for a bad token
    /// - `AUTH_INVALID` when the user was deleted
    /// - `PERMISSION_DENIED` when the account is suspended
    pub async fn authenticate_token(&self, token: &str) -> AppResult<AuthResult> {
        let claims = self.auth_manager.validate_token(token)?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::auth_invalid("Invalid user ID in token"))?;

        let user = self
            .database
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::auth_invalid("Account no longer exists"))?;

        if !user.status.can_login() {
            AppLogger::log_security_event(
                "suspended_token_use",
                "medium",
                "Token presented for a suspended account",
                Some(&user_id.to_string()),
            );
            return Err(AppError::permission_denied("Account is suspended"));
        }

        Ok(AuthResult {
            user_id: user.id,
            email: user.email,
            role: user.role,
        })
    }

    fn record_outcome(result: AppResult<AuthResult>) -> AppResult<AuthResult> {
        let span = tracing::Span::current();
        match &result {
            Ok(auth) => {
                span.record("user_id", auth.user_id.to_string())
                    .record("success", true);
                tracing::debug!(user_id = %auth.user_id, "Authentication successful");
            }
            Err(e) => {
                span.record("success", false);
                tracing::debug!(error = %e, "Authentication failed");
            }
        }
        result
    }
}
