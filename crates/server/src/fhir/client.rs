//! HTTP client for the upstream FHIR REST API

use std::time::Instant;

use fhir_mcp_core::{FhirMethod, FhirRequest};
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde_json::Value as JsonValue;

use crate::config::Config;
use crate::error::{BridgeError, UnavailableReason};

const FHIR_JSON: &str = "application/fhir+json";
const USER_AGENT: &str = concat!("fhir-mcp-server/", env!("CARGO_PKG_VERSION"));

/// Client for one upstream FHIR server.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct FhirClient {
    http: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

/// Successful (2xx) upstream response
#[derive(Debug, Clone)]
pub struct FhirResponse {
    pub status: u16,
    /// Parsed body; `None` when the server sent no content
    pub body: Option<JsonValue>,
    /// `Location` header, set by servers on create
    pub location: Option<String>,
}

impl FhirClient {
    /// Create a client from the server configuration
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static(FHIR_JSON));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.ssl_verify)
            .build()?;

        Ok(Self {
            http,
            base_url: config.fhir_base_url.trim_end_matches('/').to_string(),
            access_token: config.fhir_access_token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send `request` to the upstream server.
    ///
    /// Transport failures and timeouts become
    /// [`BridgeError::UpstreamUnavailable`]; non-2xx answers become
    /// [`BridgeError::UpstreamError`] with the body left as the server sent it.
    pub async fn execute(&self, request: &FhirRequest) -> Result<FhirResponse, BridgeError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.http.request(reqwest_method(request.method), &url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &self.access_token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            let bytes = serde_json::to_vec(body)
                .map_err(|e| BridgeError::Internal(format!("Failed to encode body: {}", e)))?;
            builder = builder.header(header::CONTENT_TYPE, FHIR_JSON).body(bytes);
        }

        tracing::debug!(method = %request.method, url = %url, "Sending FHIR request");

        let start = Instant::now();
        let result = builder.send().await;
        metrics::histogram!(
            "fhir_upstream_request_duration_seconds",
            "method" => request.method.as_str()
        )
        .record(start.elapsed().as_secs_f64());

        let response = result.map_err(unavailable)?;
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await.map_err(unavailable)?;
        let body = parse_body(&bytes);

        if !status.is_success() {
            tracing::warn!(
                method = %request.method,
                path = %request.path,
                status = status.as_u16(),
                "FHIR server returned an error"
            );
            return Err(BridgeError::UpstreamError {
                status: status.as_u16(),
                body: body.unwrap_or(JsonValue::Null),
            });
        }

        Ok(FhirResponse {
            status: status.as_u16(),
            body,
            location,
        })
    }
}

fn reqwest_method(method: FhirMethod) -> reqwest::Method {
    match method {
        FhirMethod::Get => reqwest::Method::GET,
        FhirMethod::Post => reqwest::Method::POST,
        FhirMethod::Put => reqwest::Method::PUT,
        FhirMethod::Delete => reqwest::Method::DELETE,
    }
}

fn unavailable(err: reqwest::Error) -> BridgeError {
    let reason = if err.is_timeout() {
        UnavailableReason::Timeout
    } else if err.is_connect() {
        UnavailableReason::Connect
    } else {
        UnavailableReason::Other
    };
    tracing::error!(error = %err, reason = reason.as_str(), "FHIR server unreachable");

    BridgeError::UpstreamUnavailable {
        reason,
        message: err.to_string(),
    }
}

/// JSON when possible, otherwise the raw text; empty bodies are `None`
fn parse_body(bytes: &[u8]) -> Option<JsonValue> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    Some(
        serde_json::from_slice(bytes)
            .unwrap_or_else(|_| JsonValue::String(String::from_utf8_lossy(bytes).into_owned())),
    )
}
