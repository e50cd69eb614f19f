use clap::Parser;
use dotenvy::dotenv;
use std::env;

use sheet_ledger::api::{self, config::ApiConfig};
use sheet_ledger::utils::app_config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenv();
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            env::var("RUST_LOG")
                .unwrap_or_else(|_| "info".to_string())
                .as_str(),
        )
        .init();

    let api_config = ApiConfig::parse();
    tracing::info!("API configuration loaded successfully");

    let app_config = AppConfig::from_settings(&api_config.store).await?;
    tracing::info!("Ledger store configured");

    let router = api::router(app_config, api_config.frontend_dir());

    let addr = format!("0.0.0.0:{}", api_config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Starting ledger server on {}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
