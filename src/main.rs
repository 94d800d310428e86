//! cohere-bridge - OpenAI-compatible gateway for the Cohere chat API
//!
//! This is the main entry point for the gateway server.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};

use cohere_bridge::{config::Overrides, routes, AppState, Config};

#[derive(Parser)]
#[command(name = "cohere-bridge")]
#[command(about = "OpenAI-compatible chat completions gateway for the Cohere chat API")]
struct Cli {
    /// Port to listen on (overrides BRIDGE_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind to (overrides BRIDGE_HOST)
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cohere_bridge=info,tower_http=info".into()),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting cohere-bridge");

    // Load configuration
    let config = Config::from_env(Overrides {
        host: cli.host,
        port: cli.port,
    })?;
    info!(
        upstream = %config.cohere_api_url,
        stream_only = config.stream_only,
        "Configuration loaded successfully"
    );

    // Initialize application state
    let state = Arc::new(AppState::new(config.clone())?);

    // Build the router
    let app = routes::create_router(state);

    // Bind to address
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("cohere-bridge shutdown complete");
    Ok(())
}

/// Handle graceful shutdown signals
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating shutdown");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating shutdown");
        }
    }
}
