use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

mod admin;
mod app;
mod auth;
mod config;
mod db;
mod error;
mod extract;
mod profile;
mod skills;
mod state;
mod validate;


use crate::config::AppConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "jobhunter=debug,axum=info,tower_http=info,sqlx=warn".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = Arc::new(AppConfig::from_env()?);
    if config.jwt.uses_dev_secret() {
        tracing::warn!("JWT_SECRET not set; signing tokens with the built-in development secret");
    }

    let db = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .context("connect to database")?;

    if config.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .context("run migrations")?;
    }

    let state = AppState::new(db.clone(), config.clone());
    let app = app::build_app(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("bind {}", config.bind_addr()))?;
    app::serve(listener, app, config.shutdown_grace, app::shutdown_signal()).await?;

    if tokio::time::timeout(config.shutdown_grace, db.close()).await.is_ok() {
        tracing::info!("database pool closed");
    } else {
        tracing::warn!("database pool did not close within the grace period");
    }
    Ok(())
}
