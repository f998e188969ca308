// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use teleprompter_api::app::{create_router, AppState, VERSION};
use teleprompter_api::models::settings::{AppSettings, DEFAULT_MAX_UPLOAD_BYTES};
use teleprompter_api::services::auth::AuthConfig;
use teleprompter_api::services::auth_db::AuthDbClient;
use teleprompter_api::services::cleanup::{CleanupJob, DEFAULT_CLEANUP_INTERVAL};
use teleprompter_api::services::db;
use teleprompter_api::services::email::{EmailConfig, EmailService};
use teleprompter_api::services::logging::init_tracing;
use teleprompter_api::services::translator::TranslatorConfig;

#[derive(Parser, Debug)]
#[command(version, about = "Teleprompter document and translation API", long_about = None)]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:3000")]
    bind_addr: SocketAddr,

    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://teleprompter.db")]
    database_url: String,

    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 5)]
    database_max_connections: u32,

    /// Root directory for uploaded files
    #[arg(long, env = "UPLOAD_DIR", default_value = "uploads")]
    upload_dir: PathBuf,

    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    max_upload_bytes: usize,

    /// Mark the session cookie Secure (disable for plain-HTTP development)
    #[arg(long, env = "COOKIE_SECURE", default_value_t = true, action = clap::ArgAction::Set)]
    cookie_secure: bool,

    #[arg(
        long,
        env = "CLEANUP_INTERVAL_SECS",
        default_value_t = DEFAULT_CLEANUP_INTERVAL.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    cleanup_interval_secs: u64,

    #[arg(long, env = "CORS_ALLOW_ORIGIN")]
    cors_allow_origin: Option<String>,

    /// Bootstrap administrator, created on startup when all three are set
    #[arg(long, env = "ADMIN_USERNAME", help_heading = "Admin bootstrap")]
    admin_username: Option<String>,
    #[arg(long, env = "ADMIN_EMAIL", help_heading = "Admin bootstrap")]
    admin_email: Option<String>,
    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true, help_heading = "Admin bootstrap")]
    admin_password: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let pool = db::connect(&cli.database_url, cli.database_max_connections).await?;
    tracing::info!(database_url = %cli.database_url, "database ready");

    let email = EmailService::new(EmailConfig::from_env()?)?;
    let settings = AppSettings {
        upload_dir: cli.upload_dir.clone(),
        max_upload_bytes: cli.max_upload_bytes,
        secure_cookies: cli.cookie_secure,
        cors_allow_origin: cli.cors_allow_origin.clone(),
    };
    tokio::fs::create_dir_all(&settings.upload_dir)
        .await
        .with_context(|| format!("Failed to create {}", settings.upload_dir.display()))?;

    let state = AppState::new(
        pool.clone(),
        email,
        AuthConfig::from_env(),
        TranslatorConfig::from_env(),
        settings,
    )?;

    if let (Some(username), Some(email), Some(password)) = (
        cli.admin_username.as_deref(),
        cli.admin_email.as_deref(),
        cli.admin_password.as_deref(),
    ) {
        state.auth.ensure_admin(username, email, password).await?;
    }

    let cleanup = CleanupJob::new(
        AuthDbClient::new(pool),
        Duration::from_secs(cli.cleanup_interval_secs),
    );
    tokio::spawn(async move {
        cleanup.start().await;
    });

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(cli.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", cli.bind_addr))?;

    tracing::info!(version = VERSION, addr = %cli.bind_addr, "teleprompter-api listening");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
