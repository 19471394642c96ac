// ABOUTME: HTTP server assembly for FitCoach: merges every route group and applies middleware layers
// ABOUTME: Binds the listener and serves until Ctrl+C or SIGTERM
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! # Server
//!
//! Layer order, outermost first: body size limit, request id assignment,
//! tracing span, request id propagation, CORS, timeout. The size limit sits
//! outside the layers that need a `Default` response body.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{extract::DefaultBodyLimit, http::Uri, Router};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::errors::AppError;
use crate::middleware::{
    setup_cors, MakeRequestUuid, RecordResponse, RequestSpan, REQUEST_ID_HEADER,
};
use crate::resources::ServerResources;
use crate::routes::{
    AdminRoutes, AuthRoutes, CalendarRoutes, ChangeRequestRoutes, ChatRoutes, HealthRoutes,
    LogRoutes, NotificationRoutes, PlanRoutes, TemplateRoutes, TrainerRoutes, UserRoutes,
    WebSocketRoutes,
};

/// Build the complete application router
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    let config = resources.config.clone();

    let routes = Router::new()
        .merge(HealthRoutes::routes(resources.clone()))
        .merge(AuthRoutes::routes(resources.clone()))
        .merge(UserRoutes::routes(resources.clone()))
        .merge(TrainerRoutes::routes(resources.clone()))
        .merge(TemplateRoutes::routes(resources.clone()))
        .merge(PlanRoutes::routes(resources.clone()))
        .merge(LogRoutes::routes(resources.clone()))
        .merge(CalendarRoutes::routes(resources.clone()))
        .merge(ChangeRequestRoutes::routes(resources.clone()))
        .merge(NotificationRoutes::routes(resources.clone()))
        .merge(ChatRoutes::routes(resources.clone()))
        .merge(AdminRoutes::routes(resources.clone()))
        .merge(WebSocketRoutes::routes(resources.websocket_manager.clone()))
        .fallback(handle_not_found);

    routes.layer(
        ServiceBuilder::new()
            .layer(RequestBodyLimitLayer::new(config.limits.request_body_limit()))
            .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(RequestSpan)
                    .on_response(RecordResponse),
            )
            .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
            .layer(setup_cors(&config))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.limits.request_timeout_secs,
            )))
            .layer(DefaultBodyLimit::disable()),
    )
}

async fn handle_not_found(uri: Uri) -> AppError {
    AppError::not_found(format!("Route {}", uri.path()))
}

/// Bind and serve until a shutdown signal arrives
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails
pub async fn run(resources: Arc<ServerResources>) -> Result<()> {
    let addr = format!("{}:{}", resources.config.host, resources.config.http_port);
    let listener = TcpListener::bind(&addr).await?;
    info!(address = %addr, "FitCoach server listening");

    axum::serve(listener, build_router(resources))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("FitCoach server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
