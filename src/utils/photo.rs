// ABOUTME: Validation of inline base64 photos used for workout proof and profile pictures
// ABOUTME: Accepts an optional data URL prefix and enforces the decoded size limit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::errors::{AppError, AppResult, ErrorCode};

/// Validate a base64 photo, returning the decoded size in bytes.
///
/// The value may be a bare base64 string or a `data:image/<type>;base64,` URL.
///
/// # Errors
///
/// - `MISSING_REQUIRED_FIELD` for an empty value
/// - `INVALID_FORMAT` for a non-image data URL or undecodable payload
/// - `PAYLOAD_TOO_LARGE` when the decoded photo exceeds `max_bytes`
pub fn validate_photo(photo: &str, max_bytes: usize) -> AppResult<usize> {
    let trimmed = photo.trim();
    if trimmed.is_empty() {
        return Err(AppError::missing_field("photo"));
    }

    let payload = match trimmed.strip_prefix("data:") {
        Some(data_url) => {
            let (meta, payload) = data_url
                .split_once(',')
                .ok_or_else(|| AppError::invalid_format("Photo data URL has no payload"))?;
            if !meta.starts_with("image/") || !meta.ends_with(";base64") {
                return Err(AppError::invalid_format(
                    "Photo must be a base64 encoded image",
                ));
            }
            payload
        }
        None => trimmed,
    };

    // Reject obviously oversized payloads before decoding them
    if payload.len() / 4 * 3 > max_bytes + 3 {
        return Err(too_large(max_bytes));
    }

    let decoded = STANDARD
        .decode(payload)
        .map_err(|e| AppError::invalid_format(format!("Photo is not valid base64: {e}")))?;
    if decoded.is_empty() {
        return Err(AppError::missing_field("photo"));
    }
    if decoded.len() > max_bytes {
        return Err(too_large(max_bytes));
    }
    Ok(decoded.len())
}

/// Validate an optional photo
///
/// # Errors
///
/// Same as [`validate_photo`] when a value is present
pub fn validate_optional_photo(photo: Option<&str>, max_bytes: usize) -> AppResult<()> {
    match photo {
        Some(value) if !value.trim().is_empty() => validate_photo(value, max_bytes).map(|_| ()),
        _ => Ok(()),
    }
}

fn too_large(max_bytes: usize) -> AppError {
    AppError::new(
        ErrorCode::PayloadTooLarge,
        format!("Photo exceeds the {max_bytes} byte limit"),
    )
    .with_details(serde_json::json!({ "max_bytes": max_bytes }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_bare_base64_and_data_url() {
        let encoded = STANDARD.encode([1u8, 2, 3, 4, 5]);
        assert_eq!(validate_photo(&encoded, 1024).unwrap(), 5);

        let url = format!("data:image/png;base64,{encoded}");
        assert_eq!(validate_photo(&url, 1024).unwrap(), 5);
    }

    #[test]
    fn test_rejects_non_image_data_url() {
        let encoded = STANDARD.encode(b"hello");
        let err = validate_photo(&format!("data:text/plain;base64,{encoded}"), 1024).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFormat);
    }

    #[test]
    fn test_rejects_invalid_base64() {
        let err = validate_photo("***not base64***", 1024).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFormat);
    }

    #[test]
    fn test_rejects_oversized_photo() {
        let encoded = STANDARD.encode(vec![0u8; 2048]);
        let err = validate_photo(&encoded, 1024).unwrap_err();
        assert_eq!(err.code, ErrorCode::PayloadTooLarge);
        assert_eq!(err.http_status(), 413);
    }

    #[test]
    fn test_exact_limit_is_accepted() {
        let encoded = STANDARD.encode(vec![7u8; 1024]);
        assert_eq!(validate_photo(&encoded, 1024).unwrap(), 1024);
    }

    #[test]
    fn test_empty_photo_is_missing() {
        assert_eq!(
            validate_photo("  ", 1024).unwrap_err().code,
            ErrorCode::MissingRequiredField
        );
        assert!(validate_optional_photo(None, 1024).is_ok());
        assert!(validate_optional_photo(Some(""), 1024).is_ok());
    }
}
