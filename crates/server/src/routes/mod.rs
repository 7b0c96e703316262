pub mod health;
pub mod info;
pub mod metrics;
pub mod rpc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::AppState;

/// Build the JSON-RPC routes; the endpoint is served at `/` and `/rpc`
pub fn rpc_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(rpc::handle))
        .route("/rpc", post(rpc::handle))
}

/// Build the operational routes
pub fn ops_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::check))
        .route("/info", get(info::get))
}
