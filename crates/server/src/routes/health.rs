//! Health check endpoint

use axum::{Json, extract::State};
use serde::Serialize;

use crate::{AppState, SERVICE_NAME, VERSION};

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    fhir_url: String,
}

/// GET /health - Report liveness and the configured FHIR server.
///
/// Never contacts the FHIR server, so it stays green during upstream outages.
pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
        version: VERSION,
        fhir_url: state.config.fhir_base_url.clone(),
    })
}
