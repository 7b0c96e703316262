//! Server configuration

use std::time::Duration;

use thiserror::Error;

const DEFAULT_FHIR_BASE_URL: &str = "https://hapi.fhir.org/baseR4";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8004;
const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Configuration errors, reported once at startup
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Server configuration loaded from environment variables.
///
/// Built once in `main` and shared read-only with every request.
#[derive(Debug, Clone)]
pub struct Config {
    pub fhir_base_url: String,
    pub fhir_access_token: Option<String>,
    pub timeout: Duration,
    pub ssl_verify: bool,
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    /// Largest JSON-RPC request body accepted, in bytes
    pub max_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fhir_base_url: DEFAULT_FHIR_BASE_URL.to_string(),
            fhir_access_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            ssl_verify: true,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cors_origins: vec!["*".to_string()],
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let timeout_secs = match var("FHIR_MCP_FHIR__TIMEOUT") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => return Err(invalid("FHIR_MCP_FHIR__TIMEOUT", "a positive integer", raw)),
            },
            None => DEFAULT_TIMEOUT_SECS,
        };

        let port = match var("FHIR_MCP_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| invalid("FHIR_MCP_PORT", "a port number", raw.clone()))?,
            None => DEFAULT_PORT,
        };

        let ssl_verify = match var("FHIR_MCP_SSL_VERIFY") {
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => return Err(invalid("FHIR_MCP_SSL_VERIFY", "true or false", raw)),
            },
            None => true,
        };

        let max_body_bytes = match var("FHIR_MCP_MAX_BODY_BYTES") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(bytes) if bytes > 0 => bytes,
                _ => return Err(invalid("FHIR_MCP_MAX_BODY_BYTES", "a positive integer", raw)),
            },
            None => DEFAULT_MAX_BODY_BYTES,
        };

        let cors_origins = var("FHIR_MCP_CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.cors_origins);

        Ok(Self {
            fhir_base_url: var("FHIR_MCP_FHIR__BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.fhir_base_url),
            fhir_access_token: var("FHIR_MCP_FHIR__ACCESS_TOKEN"),
            timeout: Duration::from_secs(timeout_secs),
            ssl_verify,
            host: var("FHIR_MCP_HOST").unwrap_or(defaults.host),
            port,
            cors_origins,
            max_body_bytes,
        })
    }

    /// `host:port` string for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn invalid(var: &'static str, expected: &'static str, value: String) -> ConfigError {
    ConfigError::Invalid {
        var,
        expected,
        value,
    }
}
