//! jsondiff server binary

use anyhow::Context;
use clap::Parser;
use jsondiff_core::logging_facility;
use jsondiff_server::{router, AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = ServerConfig::parse();
    logging_facility::init(config.log_profile);

    let state = AppState::from_config(&config).context("failed to initialize application state")?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    tracing::info!(bind = %config.bind, "jsondiff server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
