// ABOUTME: CORS middleware configuration for the REST API and WebSocket handshake
// ABOUTME: Allows any origin or an explicit comma separated list from configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use http::{header::HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::ServerConfig;

/// Configure CORS settings for the API
///
/// `CORS_ALLOWED_ORIGINS="*"` (or empty) allows any origin. A comma separated
/// list restricts browsers to those origins and enables credentials so the
/// `auth_token` cookie is sent.
///
/// ```bash
/// export CORS_ALLOWED_ORIGINS="https://app.example.com,https://admin.example.com"
/// ```
#[must_use]
pub fn setup_cors(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors
        .allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty() && *origin != "*")
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    let layer = CorsLayer::new()
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("authorization"),
            HeaderName::from_static("x-requested-with"),
            HeaderName::from_static("accept"),
            HeaderName::from_static("origin"),
            HeaderName::from_static("x-request-id"),
        ])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
            Method::PATCH,
        ]);

    if origins.is_empty() {
        layer.allow_origin(AllowOrigin::any())
    } else {
        // Wildcard origins cannot be combined with credentials
        layer
            .allow_origin(AllowOrigin::list(origins))
            .allow_credentials(true)
    }
}
