//! Hosted backend connection configuration.

use serde::{Deserialize, Serialize};

/// Connection settings for the remote data gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Project base URL, e.g. `https://xyz.example.co`. The REST API lives
    /// under `/rest/v1` and auth under `/auth/v1`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Public (anonymous) API key sent as the `apikey` header.
    #[serde(default)]
    pub anon_key: String,
    /// Database schema exposed through the REST API.
    #[serde(default = "default_schema")]
    pub schema: String,
    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            anon_key: String::new(),
            schema: default_schema(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:54321".to_string()
}

fn default_schema() -> String {
    "public".to_string()
}

fn default_request_timeout() -> u64 {
    15
}
