// ABOUTME: Server binary for the FitCoach personal training platform
// ABOUTME: Loads configuration from the environment, opens the database and serves the API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! # FitCoach Server Binary
//!
//! Starts the REST API and WebSocket chat on the configured port.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use fitcoach_server::{
    config::ServerConfig, database::Database, logging, mailer::LogMailer,
    resources::ServerResources, server,
};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "fitcoach-server")]
#[command(about = "FitCoach - personal training platform API")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(database_url) = args.database_url {
        config.database.url = database_url;
    }

    logging::init_from_env()?;
    config.validate()?;

    info!("Starting FitCoach server");
    info!("{}", config.summary());

    let database = Database::new(&config.database.url).await?;
    info!("Database initialized: {}", config.database.url);

    let resources = Arc::new(ServerResources::new(
        database,
        Arc::new(config),
        Arc::new(LogMailer),
    ));

    if let Err(e) = server::run(resources).await {
        error!("Server error: {e:#}");
        return Err(e);
    }
    Ok(())
}
