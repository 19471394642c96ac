// ABOUTME: Request field validation for accounts and free-text inputs
// ABOUTME: Email shape, password length and bounded optional text
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use crate::constants::auth::MIN_PASSWORD_LENGTH;
use crate::constants::limits::MAX_TEXT_LENGTH;
use crate::errors::{AppError, AppResult, ErrorCode};

/// Check that an email has a non-empty local part and a dotted domain
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.contains(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

/// Validate an email field
///
/// # Errors
///
/// Returns `INVALID_FORMAT` for malformed addresses
pub fn validate_email(email: &str) -> AppResult<()> {
    if email.trim().is_empty() {
        return Err(AppError::missing_field("email"));
    }
    if !is_valid_email(email) {
        return Err(AppError::invalid_format("Invalid email address"));
    }
    Ok(())
}

/// Validate a new password
///
/// # Errors
///
/// Returns `INVALID_INPUT` when shorter than the minimum length
pub fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::invalid_input(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Trim a required text field
///
/// # Errors
///
/// Returns `MISSING_REQUIRED_FIELD` when empty after trimming
pub fn required_text(value: &str, field: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::missing_field(field));
    }
    check_length(trimmed, field)?;
    Ok(trimmed.to_owned())
}

/// Trim an optional text field, mapping blank values to `None`
///
/// # Errors
///
/// Returns `VALUE_OUT_OF_RANGE` when longer than the text limit
pub fn optional_text(value: Option<&str>, field: &str) -> AppResult<Option<String>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(text) => {
            check_length(text, field)?;
            Ok(Some(text.to_owned()))
        }
        None => Ok(None),
    }
}

fn check_length(value: &str, field: &str) -> AppResult<()> {
    if value.chars().count() > MAX_TEXT_LENGTH {
        return Err(AppError::new(
            ErrorCode::ValueOutOfRange,
            format!("Field '{field}' exceeds {MAX_TEXT_LENGTH} characters"),
        ));
    }
    Ok(())
}
