// ABOUTME: Administrative setup utility that bootstraps admin accounts
// ABOUTME: Admins cannot self-register, so the first one is created from the command line
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! Usage:
//! ```bash
//! # Create an admin account
//! cargo run --bin admin-setup -- create-admin-user --email admin@gym.example --password 'S3curePass!'
//!
//! # Promote an existing account to admin and reset its password
//! cargo run --bin admin-setup -- create-admin-user --email coach@gym.example --password 'S3curePass!' --force
//!
//! # List admin accounts
//! cargo run --bin admin-setup -- list-admins
//! ```

use std::env;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use fitcoach_core::models::User;
use fitcoach_core::permissions::UserRole;
use fitcoach_server::{
    constants::defaults,
    database::{Database, UserFilter},
    utils::validation::{required_text, validate_email, validate_password},
};
use tracing::{error, info};

#[derive(Parser)]
#[command(
    name = "admin-setup",
    about = "FitCoach admin account management",
    long_about = "Create, promote and list FitCoach admin accounts. Admin accounts cannot be created through the public registration endpoint."
)]
struct AdminSetupArgs {
    #[command(subcommand)]
    command: AdminCommand,

    /// Database URL override
    #[arg(long)]
    database_url: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Subcommand)]
enum AdminCommand {
    /// Create an admin account
    CreateAdminUser {
        /// Admin email (required)
        #[arg(long)]
        email: String,

        /// Admin password (required)
        #[arg(long)]
        password: String,

        /// Admin display name
        #[arg(long, default_value = "FitCoach Admin")]
        name: String,

        /// Promote the account if the email is already registered
        #[arg(long)]
        force: bool,
    },

    /// List admin accounts
    ListAdmins,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = AdminSetupArgs::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    let database_url = args
        .database_url
        .or_else(|| env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| defaults::DATABASE_URL.to_owned());

    info!("Connecting to database: {}", database_url);
    let database = Database::new(&database_url).await?;

    match args.command {
        AdminCommand::CreateAdminUser {
            email,
            password,
            name,
            force,
        } => create_admin_user_command(&database, &email, &password, &name, force).await,
        AdminCommand::ListAdmins => list_admins_command(&database).await,
    }
}

fn bcrypt_cost() -> u32 {
    env::var("BCRYPT_COST")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(defaults::BCRYPT_COST)
}

async fn create_admin_user_command(
    database: &Database,
    email: &str,
    password: &str,
    name: &str,
    force: bool,
) -> Result<()> {
    let email = email.trim().to_lowercase();
    validate_email(&email)?;
    validate_password(password)?;
    let name = required_text(name, "name")?;
    let password_hash = bcrypt::hash(password, bcrypt_cost())?;

    if let Some(existing) = database.get_user_by_email(&email).await? {
        if !force {
            error!("User '{}' already exists ({})", email, existing.role);
            info!("Use --force to promote the existing account to admin");
            return Err(anyhow!("User already exists (use --force to promote)"));
        }

        info!(previous_role = %existing.role, "Promoting existing account to admin");
        database
            .promote_to_admin(existing.id, &name, &password_hash)
            .await?;
        println!("Promoted {email} to admin (id {})", existing.id);
        return Ok(());
    }

    let admin = User::new(&email, password_hash, name, UserRole::Admin);
    database.create_user(&admin).await?;

    println!("Admin account created");
    println!("  Email: {}", admin.email);
    println!("  Name:  {}", admin.name);
    println!("  Id:    {}", admin.id);
    println!("Sign in through POST /api/auth/login and change the password afterwards.");
    Ok(())
}

async fn list_admins_command(database: &Database) -> Result<()> {
    let admins = database
        .list_users(UserFilter {
            role: Some(UserRole::Admin),
            status: None,
        })
        .await?;

    if admins.is_empty() {
        println!("No admin accounts. Create one with `admin-setup create-admin-user`.");
        return Ok(());
    }

    for admin in admins {
        println!(
            "{}  {}  {}  {}  created {}",
            admin.id,
            admin.email,
            admin.name,
            admin.status.as_str(),
            admin.created_at.format("%Y-%m-%d %H:%M UTC")
        );
    }
    Ok(())
}
