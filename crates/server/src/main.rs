//! fhir-mcp-server: MCP bridge to a FHIR R4 server, binary entrypoint.

use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fhir_mcp_server::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Load configuration
    let config = Config::from_env()
        .inspect_err(|e| tracing::error!(error = %e, "Invalid configuration"))?;

    // Log startup info
    tracing::info!(fhir_url = %config.fhir_base_url, "Upstream FHIR server");
    if config.fhir_access_token.is_some() {
        tracing::info!("Bearer token configured for FHIR requests");
    } else {
        tracing::warn!("No FHIR access token (FHIR_MCP_FHIR__ACCESS_TOKEN not set)");
    }
    if !config.ssl_verify {
        tracing::warn!("TLS certificate verification disabled for the FHIR server");
    }
    tracing::info!(
        "Request timeout: {}s, MCP protocol {}",
        config.timeout.as_secs(),
        fhir_mcp_server::MCP_PROTOCOL_VERSION
    );

    let addr: SocketAddr = config.bind_address().parse()?;

    // Build application
    let app = fhir_mcp_server::build_app(config)?;

    // Start server
    tracing::info!("Starting FHIR MCP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
