// ABOUTME: User authentication route handlers for registration, login and password management
// ABOUTME: Issues JWT sessions as bearer tokens and HttpOnly cookies, and runs the reset-token flow
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! Authentication routes
//!
//! Handlers are thin wrappers around [`AuthService`], which owns the
//! registration, login and password rules.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{generate_reset_token, hash_reset_token};
use crate::constants::auth::AUTH_COOKIE_NAME;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::mailer::OutgoingEmail;
use crate::resources::ServerResources;
use crate::utils::cookies::{auth_cookie, clear_cookie};
use crate::utils::validation::{optional_text, required_text, validate_email, validate_password};
use fitcoach_core::models::{User, UserProfile};
use fitcoach_core::permissions::UserRole;

/// User registration request
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    /// Login email
    pub email: String,
    /// Plain password, at least 8 characters
    pub password: String,
    /// Display name
    pub name: String,
    /// `client` or `trainer`
    #[serde(default)]
    pub role: UserRole,
    /// Trainer specialization
    pub specialization: Option<String>,
    /// Trainer experience
    pub experience_years: Option<u32>,
    /// Short biography
    pub bio: Option<String>,
    /// Trainer certifications
    pub certifications: Option<String>,
}

/// User registration response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// New account id
    pub user_id: Uuid,
    /// Human readable outcome
    pub message: String,
}

/// User login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login email
    pub email: String,
    /// Plain password
    pub password: String,
}

/// User login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Signed JWT
    pub token: String,
    /// Token expiry
    pub expires_at: DateTime<Utc>,
    /// Authenticated user
    pub user: UserProfile,
}

/// Password change for a logged-in user
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    /// Password currently set
    pub current_password: String,
    /// Replacement password
    pub new_password: String,
}

/// Start of the password reset flow
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    /// Account email
    pub email: String,
}

/// End of the password reset flow
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    /// Token from the reset link
    pub token: String,
    /// Replacement password
    pub new_password: String,
}

/// Simple acknowledgement body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human readable outcome
    pub message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Authentication service for business logic
#[derive(Clone)]
pub struct AuthService {
    resources: Arc<ServerResources>,
}

impl AuthService {
    /// Create a service over the shared resources
    #[must_use]
    pub const fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Register a client or a (pending) trainer
    ///
    /// # Errors
    ///
    /// Returns validation errors, `PERMISSION_DENIED` for admin
    /// self-registration and `RESOURCE_ALREADY_EXISTS` for a taken email
    pub async fn register(&self, request: RegisterRequest) -> AppResult<RegisterResponse> {
        tracing::info!(email = %request.email, role = request.role.as_str(), "User registration attempt");

        validate_email(&request.email)?;
        validate_password(&request.password)?;
        let name = required_text(&request.name, "name")?;
        if !request.role.is_self_registrable() {
            return Err(AppError::permission_denied(
                "Admin accounts cannot be self-registered",
            ));
        }

        let database = &self.resources.database;
        if database.get_user_by_email(&request.email).await?.is_some() {
            return Err(AppError::already_exists(format!(
                "Email {} is already registered",
                request.email.trim().to_lowercase()
            )));
        }

        let password_hash = self
            .resources
            .auth_manager
            .hash_password(request.password)
            .await?;
        let mut user = User::new(&request.email, password_hash, name, request.role);
        user.profile.bio = optional_text(request.bio.as_deref(), "bio")?;
        if user.role == UserRole::Trainer {
            user.profile.specialization =
                optional_text(request.specialization.as_deref(), "specialization")?;
            user.profile.experience_years = request.experience_years;
            user.profile.certifications =
                optional_text(request.certifications.as_deref(), "certifications")?;
        }

        database.create_user(&user).await?;
        AppLogger::log_auth_event(&user.id.to_string(), "register", true, Some(user.role.as_str()));

        let message = if user.role == UserRole::Trainer {
            "Trainer account created. An administrator must approve it before you can coach clients."
        } else {
            "Account created successfully"
        };
        Ok(RegisterResponse {
            user_id: user.id,
            message: message.to_owned(),
        })
    }

    /// Check credentials and issue a session token
    ///
    /// # Errors
    ///
    /// Returns `AUTH_INVALID` for unknown emails or wrong passwords and
    /// `PERMISSION_DENIED` for suspended accounts
    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginResponse> {
        let invalid = || AppError::auth_invalid("Invalid email or password");

        let Some(user) = self
            .resources
            .database
            .get_user_by_email(&request.email)
            .await?
        else {
            AppLogger::log_auth_event(&request.email, "login", false, Some("unknown email"));
            return Err(invalid());
        };

        let valid = self
            .resources
            .auth_manager
            .verify_password(request.password, user.password_hash.clone())
            .await?;
        if !valid {
            AppLogger::log_auth_event(&user.id.to_string(), "login", false, Some("bad password"));
            return Err(invalid());
        }

        if !user.status.can_login() {
            AppLogger::log_auth_event(&user.id.to_string(), "login", false, Some("suspended"));
            return Err(AppError::permission_denied("Account is suspended"));
        }

        let (token, expires_at) = self.resources.auth_manager.generate_token(&user)?;
        AppLogger::log_auth_event(&user.id.to_string(), "login", true, None);

        Ok(LoginResponse {
            token,
            expires_at,
            user: UserProfile::from(&user),
        })
    }

    /// Change the password of a logged-in user
    ///
    /// # Errors
    ///
    /// Returns `AUTH_INVALID` when the current password does not match
    pub async fn change_password(
        &self,
        user_id: Uuid,
        request: ChangePasswordRequest,
    ) -> AppResult<()> {
        let user = self
            .resources
            .database
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        let auth_manager = &self.resources.auth_manager;
        if !auth_manager
            .verify_password(request.current_password, user.password_hash)
            .await?
        {
            return Err(AppError::auth_invalid("Current password is incorrect"));
        }

        validate_password(&request.new_password)?;
        let hash = auth_manager.hash_password(request.new_password).await?;
        self.resources.database.update_password(user_id, &hash).await?;
        AppLogger::log_auth_event(&user_id.to_string(), "password_change", true, None);
        Ok(())
    }

    /// Issue a reset token and mail the link when the account exists.
    ///
    /// The outcome is never reported to the caller so the endpoint does not
    /// reveal which emails are registered.
    pub async fn forgot_password(&self, request: ForgotPasswordRequest) {
        match self.issue_reset_token(&request.email).await {
            Ok(true) => tracing::info!("Password reset email dispatched"),
            Ok(false) => tracing::debug!("Password reset requested for unknown or suspended account"),
            Err(e) => tracing::warn!(error = %e, "Password reset request failed"),
        }
    }

    async fn issue_reset_token(&self, email: &str) -> AppResult<bool> {
        let Some(user) = self.resources.database.get_user_by_email(email).await? else {
            return Ok(false);
        };
        if !user.status.can_login() {
            return Ok(false);
        }

        let ttl_minutes = self.resources.config.auth.password_reset_ttl_minutes;
        let (token, token_hash) = generate_reset_token();
        self.resources
            .database
            .store_password_reset_token(
                user.id,
                &token_hash,
                Utc::now() + Duration::minutes(ttl_minutes),
            )
            .await?;

        let link = format!(
            "{}/reset-password?token={token}",
            self.resources.config.frontend_url.trim_end_matches('/')
        );
        self.resources
            .mailer
            .send(OutgoingEmail::password_reset(
                &user.email,
                &user.name,
                &link,
                ttl_minutes,
            ))
            .await?;
        AppLogger::log_auth_event(&user.id.to_string(), "password_reset_requested", true, None);
        Ok(true)
    }

    /// Consume a reset token and set the new password
    ///
    /// # Errors
    ///
    /// Returns `AUTH_INVALID` for unknown, used or expired tokens
    pub async fn reset_password(&self, request: ResetPasswordRequest) -> AppResult<()> {
        let token = request.token.trim();
        if token.is_empty() {
            return Err(AppError::missing_field("token"));
        }
        validate_password(&request.new_password)?;

        let password_hash = self
            .resources
            .auth_manager
            .hash_password(request.new_password)
            .await?;
        let user_id = self
            .resources
            .database
            .reset_password_with_token(&hash_reset_token(token), &password_hash)
            .await?;
        AppLogger::log_auth_event(&user_id.to_string(), "password_reset", true, None);
        Ok(())
    }
}

/// Authentication routes
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/auth/register", post(Self::handle_register))
            .route("/api/auth/login", post(Self::handle_login))
            .route("/api/auth/logout", post(Self::handle_logout))
            .route("/api/auth/me", get(Self::handle_me))
            .route("/api/auth/password", put(Self::handle_change_password))
            .route("/api/auth/forgot-password", post(Self::handle_forgot_password))
            .route("/api/auth/reset-password", post(Self::handle_reset_password))
            .with_state(resources)
    }

    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<RegisterRequest>,
    ) -> Result<Response, AppError> {
        let response = AuthService::new(resources).register(request).await?;
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<LoginRequest>,
    ) -> Result<Response, AppError> {
        let secure = resources.config.environment.is_production();
        let response = AuthService::new(resources).login(request).await?;
        let max_age = (response.expires_at - Utc::now()).num_seconds().max(0);
        let cookie = auth_cookie(AUTH_COOKIE_NAME, &response.token, max_age, secure);
        Ok((StatusCode::OK, [(SET_COOKIE, cookie)], Json(response)).into_response())
    }

    async fn handle_logout() -> Response {
        (
            StatusCode::OK,
            [(SET_COOKIE, clear_cookie(AUTH_COOKIE_NAME))],
            Json(MessageResponse::new("Logged out")),
        )
            .into_response()
    }

    async fn handle_me(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = super::authenticate(&headers, &resources).await?;
        let user = resources
            .database
            .get_user(auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;
        Ok((StatusCode::OK, Json(UserProfile::from(&user))).into_response())
    }

    async fn handle_change_password(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<ChangePasswordRequest>,
    ) -> Result<Response, AppError> {
        let auth = super::authenticate(&headers, &resources).await?;
        AuthService::new(resources)
            .change_password(auth.user_id, request)
            .await?;
        Ok((StatusCode::OK, Json(MessageResponse::new("Password updated"))).into_response())
    }

    async fn handle_forgot_password(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<ForgotPasswordRequest>,
    ) -> Response {
        AuthService::new(resources).forgot_password(request).await;
        (
            StatusCode::OK,
            Json(MessageResponse::new(
                "If an account exists for that email, a reset link has been sent",
            )),
        )
            .into_response()
    }

    async fn handle_reset_password(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<ResetPasswordRequest>,
    ) -> Result<Response, AppError> {
        AuthService::new(resources).reset_password(request).await?;
        Ok((StatusCode::OK, Json(MessageResponse::new("Password has been reset"))).into_response())
    }
}
