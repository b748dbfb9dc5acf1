//! Binary entry point: configuration, store connection, HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use docket::config::ServiceConfig;
use docket::db;
use docket::web::server::{AppState, start_server};

#[derive(Debug, Parser)]
#[command(name = "docket", about = "Case registry backend for law practices")]
struct Args {
    /// Address to bind the HTTP listener on.
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:8000")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = ServiceConfig::from_env()?;
    let store = db::connect_from_config(&config).await?;
    tracing::info!(db_name = %config.db_name, "connected to document store");

    let state = Arc::new(AppState::new(store));
    let (addr, server) = start_server(args.bind, Arc::clone(&state)).await?;
    tracing::info!(%addr, "case registry listening");

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received");
    state.shutdown().await;
    server.await?;

    Ok(())
}
