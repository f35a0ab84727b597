use anyhow::Context;
use clap::Parser;

mod accounts;
mod app;
mod auth;
mod config;
mod error;
mod seed;
mod state;
#[cfg(test)]
mod testing;

use crate::{config::AppConfig, state::AppState};

#[derive(Parser)]
#[command(name = "bankapi")]
#[command(about = "Account service with JWT-guarded account access", long_about = None)]
struct Cli {
    /// Create a demo account before serving
    #[arg(long)]
    seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "bankapi=debug,axum=info,tower_http=info".to_string());
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

    let config = AppConfig::from_env().context("load configuration")?;
    let app_state = AppState::init(config).await?;
    let config = app_state.config.clone();

    if cli.seed {
        tracing::info!("seeding the database");
        seed::seed_accounts(&app_state).await?;
    }

    let app = app::build_app(app_state);
    app::serve(app, &config.host, config.port).await
}
