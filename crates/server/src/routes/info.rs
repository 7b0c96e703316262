//! Service information endpoint

use axum::{Json, extract::State};
use chrono::Utc;
use serde_json::{Value as JsonValue, json};

use crate::{AppState, MCP_PROTOCOL_VERSION, SERVICE_NAME, VERSION};

/// GET /info - Describe the service, its endpoints and uptime
pub async fn get(State(state): State<AppState>) -> Json<JsonValue> {
    let uptime = (Utc::now() - state.started_at).num_seconds().max(0);

    Json(json!({
        "service": SERVICE_NAME,
        "version": VERSION,
        "status": "running",
        "protocolVersion": MCP_PROTOCOL_VERSION,
        "endpoints": {
            "health": "/health",
            "info": "/info",
            "metrics": "/metrics",
            "mcp": "/ or /rpc (POST with JSON-RPC 2.0)"
        },
        "fhir_url": state.config.fhir_base_url,
        "started_at": state.started_at.to_rfc3339(),
        "uptime_seconds": uptime,
    }))
}
