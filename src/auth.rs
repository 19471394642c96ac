// ABOUTME: JWT-based user authentication and password hashing
// ABOUTME: Issues and validates HS256 tokens and wraps bcrypt on the blocking pool
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! # Authentication
//!
//! Tokens are HS256 JWTs carrying the user id, email and role. The role in a
//! token is informational only: every authenticated request reloads the user
//! so suspensions and role changes apply immediately.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::task;
use uuid::Uuid;

use crate::constants::auth::{JWT_AUDIENCE, JWT_ISSUER, RESET_TOKEN_BYTES};
use crate::errors::{AppError, AppResult};
use fitcoach_core::models::User;
use fitcoach_core::permissions::UserRole;

/// `JWT` validation error with detailed information
#[derive(Debug, Clone, Error)]
pub enum JwtValidationError {
    /// Token lifetime is over
    #[error("JWT token has expired")]
    TokenExpired,
    /// Signature, audience or issuer mismatch
    #[error("JWT token is invalid: {reason}")]
    TokenInvalid {
        /// Reason for invalidity
        reason: String,
    },
    /// Not a JWT at all
    #[error("JWT token is malformed: {details}")]
    TokenMalformed {
        /// Details about malformation
        details: String,
    },
}

impl From<JwtValidationError> for AppError {
    fn from(error: JwtValidationError) -> Self {
        match error {
            JwtValidationError::TokenExpired => Self::auth_expired(),
            other => Self::auth_invalid(other.to_string()),
        }
    }
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// User email
    pub email: String,
    /// Role at issue time
    pub role: UserRole,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
    /// Audience
    pub aud: String,
    /// Issuer
    pub iss: String,
    /// Token id
    pub jti: String,
}

/// Identity attached to an authenticated request
#[derive(Debug, Clone)]
pub struct AuthResult {
    /// Authenticated user
    pub user_id: Uuid,
    /// Current email
    pub email: String,
    /// Current role
    pub role: UserRole,
}

/// Token issuer and validator
#[derive(Clone)]
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_hours: i64,
    bcrypt_cost: u32,
}

impl AuthManager {
    /// Create an auth manager from a shared secret
    #[must_use]
    pub fn new(secret: &[u8], expiry_hours: i64, bcrypt_cost: u32) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            expiry_hours,
            bcrypt_cost,
        }
    }

    /// Issue a token for a user
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails
    pub fn generate_token(&self, user: &User) -> AppResult<(String, DateTime<Utc>)> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.expiry_hours);
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            aud: JWT_AUDIENCE.to_owned(),
            iss: JWT_ISSUER.to_owned(),
            jti: Uuid::new_v4().to_string(),
        };
        self.encode_claims(&claims).map(|token| (token, expires_at))
    }

    /// Sign arbitrary claims
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails
    pub fn encode_claims(&self, claims: &Claims) -> AppResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign token: {e}")))
    }

    /// Validate a token and return its claims
    ///
    /// # Errors
    ///
    /// Returns a [`JwtValidationError`] describing why the token was refused
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtValidationError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[JWT_AUDIENCE]);
        validation.set_issuer(&[JWT_ISSUER]);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtValidationError::TokenExpired,
                ErrorKind::InvalidToken
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_) => JwtValidationError::TokenMalformed {
                    details: e.to_string(),
                },
                _ => JwtValidationError::TokenInvalid {
                    reason: e.to_string(),
                },
            })
    }

    /// Hash a password with bcrypt on the blocking pool
    ///
    /// # Errors
    ///
    /// Returns an error if hashing fails
    pub async fn hash_password(&self, password: String) -> AppResult<String> {
        let cost = self.bcrypt_cost;
        task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))
    }

    /// Verify a password against a bcrypt hash on the blocking pool
    ///
    /// # Errors
    ///
    /// Returns an error if the hash is unreadable
    pub async fn verify_password(&self, password: String, hash: String) -> AppResult<bool> {
        task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))?
            .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))
    }
}

/// Generate a random password reset token and its SHA-256 hash
///
/// Returns `(token, hex_hash)`. Only the hash is stored.
#[must_use]
pub fn generate_reset_token() -> (String, String) {
    let mut bytes = [0u8; RESET_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    let token = hex::encode(bytes);
    let hash = hash_reset_token(&token);
    (token, hash)
}

/// SHA-256 hex digest of a reset token
#[must_use]
pub fn hash_reset_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> AuthManager {
        AuthManager::new(b"unit-test-secret", 24, 4)
    }

    fn user() -> User {
        User::new("a@example.com", "h".into(), "A".into(), UserRole::Client)
    }

    #[test]
    fn test_token_round_trip_keeps_identity() {
        let auth = manager();
        let user = user();
        let (token, expires_at) = auth.generate_token(&user).unwrap();
        let claims = auth.validate_token(&token).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.role, UserRole::Client);
        assert_eq!(claims.exp, expires_at.timestamp());
    }

    #[test]
    fn test_expired_token_is_reported() {
        let auth = manager();
        let now = Utc::now();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            email: "a@example.com".into(),
            role: UserRole::Client,
            iat: (now - Duration::hours(2)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
            aud: JWT_AUDIENCE.into(),
            iss: JWT_ISSUER.into(),
            jti: Uuid::new_v4().to_string(),
        };
        let token = auth.encode_claims(&claims).unwrap();
        assert!(matches!(
            auth.validate_token(&token),
            Err(JwtValidationError::TokenExpired)
        ));
    }

    #[test]
    fn test_foreign_signature_is_rejected() {
        let other = AuthManager::new(b"another-secret", 24, 4);
        let (token, _) = other.generate_token(&user()).unwrap();
        assert!(matches!(
            manager().validate_token(&token),
            Err(JwtValidationError::TokenInvalid { .. })
        ));
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert!(matches!(
            manager().validate_token("not-a-jwt"),
            Err(JwtValidationError::TokenMalformed { .. })
        ));
    }

    #[test]
    fn test_reset_token_hash_matches() {
        let (token, hash) = generate_reset_token();
        assert_eq!(token.len(), RESET_TOKEN_BYTES * 2);
        assert_eq!(hash_reset_token(&token), hash);
        assert_ne!(token, hash);
    }

    #[tokio::test]
    async fn test_password_hash_and_verify() {
        let auth = manager();
        let hash = auth.hash_password("correct horse".into()).await.unwrap();
        assert!(auth.verify_password("correct horse".into(), hash.clone()).await.unwrap());
        assert!(!auth.verify_password("wrong".into(), hash).await.unwrap());
    }
}
