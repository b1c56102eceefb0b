//! paygate-mock server entry point.

mod cli;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use paygate_mock::server::routes::ENDPOINTS;
use paygate_mock::{serve, MockService};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    info!("paygate-mock v{}", env!("CARGO_PKG_VERSION"));

    let config = cli.into_config().context("failed to load configuration")?;
    let bind_addr = config.bind_addr;
    let service = Arc::new(MockService::new(config)?);
    info!("Seeded {} sites", service.site_count());

    for (method, path) in ENDPOINTS {
        info!("  {:<4} {}", method, path);
    }

    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    serve(listener, service, shutdown_signal()).await?;

    info!("Goodbye!");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
