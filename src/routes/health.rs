// ABOUTME: Health check route handler for service monitoring
// ABOUTME: Reports service status, version and database reachability
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! Health check route for load balancers and uptime probes

use std::sync::Arc;

use crate::resources::ServerResources;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create the health check route
    pub fn routes(resources: Arc<ServerResources>) -> axum::Router {
        use axum::{extract::State, http::StatusCode, routing::get, Json, Router};

        use crate::constants::service_names::SERVER_VERSION;

        async fn health_handler(
            State(resources): State<Arc<ServerResources>>,
        ) -> (StatusCode, Json<serde_json::Value>) {
            let database = match resources.database.health_check().await {
                Ok(()) => "connected",
                Err(e) => {
                    tracing::warn!(error = %e, "Database health check failed");
                    "unavailable"
                }
            };
            let (status_code, status) = if database == "connected" {
                (StatusCode::OK, "healthy")
            } else {
                (StatusCode::SERVICE_UNAVAILABLE, "degraded")
            };

            (
                status_code,
                Json(serde_json::json!({
                    "status": status,
                    "version": SERVER_VERSION,
                    "database": database,
                    "timestamp": chrono::Utc::now().to_rfc3339()
                })),
            )
        }

        Router::new()
            .route("/health", get(health_handler))
            .with_state(resources)
    }
}
