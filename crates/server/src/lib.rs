//! fhir-mcp-server library crate
//!
//! Exposes `build_app` and `config` for integration tests.
//! The actual binary entrypoint is in `main.rs`.

mod audit;
pub mod config;
mod dispatch;
pub mod error;
pub mod fhir;
mod middleware;
mod normalize;
mod routes;

use std::sync::Arc;

use axum::{
    Extension, Router, extract::DefaultBodyLimit, http::HeaderValue, middleware as axum_mw,
    routing::get,
};
use chrono::{DateTime, Utc};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use fhir::FhirClient;

/// Name reported by `/health`, `/info` and `initialize`
pub const SERVICE_NAME: &str = "FHIR MCP Server";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// MCP protocol revision announced in `initialize`
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// State shared by every handler; read-only after startup
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub fhir: FhirClient,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let fhir = FhirClient::new(&config)?;
        Ok(Self {
            config: Arc::new(config),
            fhir,
            started_at: Utc::now(),
        })
    }
}

/// Build the full application router with all routes and middleware.
///
/// Extracted from `main()` so integration tests can construct the app
/// without binding to a TCP port.
pub fn build_app(config: Config) -> Result<Router, reqwest::Error> {
    let state = AppState::new(config)?;

    // Install Prometheus metrics recorder.
    // Use build_recorder() + set_global_recorder() so that repeated calls
    // (e.g. in integration tests) don't panic; the second install is
    // silently ignored and we still get a valid handle for /metrics.
    let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
    let prometheus_handle = recorder.handle();
    let _ = metrics::set_global_recorder(recorder);

    let metrics_routes = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .layer(Extension(prometheus_handle));

    // Build CORS layer
    let cors = if state.config.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let rpc_routes =
        routes::rpc_routes().layer(DefaultBodyLimit::max(state.config.max_body_bytes));

    // Build application
    let app = Router::new()
        .merge(rpc_routes)
        .merge(routes::ops_routes())
        .merge(metrics_routes)
        .route_layer(axum_mw::from_fn(middleware::metrics_middleware))
        .with_state(state)
        .layer(axum_mw::from_fn(middleware::request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(app)
}
