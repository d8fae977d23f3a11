//! Table API client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use treetag_core::config::gateway::GatewayConfig;
use treetag_core::error::{AppError, ErrorKind};
use treetag_core::result::AppResult;
use treetag_core::traits::gateway::Gateway;
use treetag_core::types::query::{QueryPage, SelectQuery};

use super::TokenSlot;
use super::params::{parse_content_range, query_pairs, range_header};

/// Client for a PostgREST-style table API under `{base_url}/rest/v1`.
#[derive(Debug, Clone)]
pub struct RestGateway {
    /// Shared HTTP client.
    client: Client,
    /// `{base_url}/rest/v1`.
    rest_url: String,
    /// Public API key.
    anon_key: String,
    /// Exposed schema.
    schema: String,
    /// Current user's access token.
    token: TokenSlot,
}

impl RestGateway {
    /// Create a table client from configuration.
    pub fn new(config: &GatewayConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            client,
            rest_url: format!("{}/rest/v1", config.base_url.trim_end_matches('/')),
            anon_key: config.anon_key.clone(),
            schema: config.schema.clone(),
            token: Arc::new(RwLock::new(None)),
        })
    }

    /// The token slot; hand it to [`RestAuth`](super::RestAuth) so signed-in
    /// requests carry the user's bearer token.
    pub fn token_slot(&self) -> TokenSlot {
        self.token.clone()
    }

    /// Replace the bearer token directly.
    pub async fn set_access_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    fn table_url(&self, table: &str, pairs: &[(String, String)]) -> AppResult<Url> {
        let mut url = Url::parse(&format!("{}/{table}", self.rest_url))
            .map_err(|e| AppError::configuration(format!("Invalid gateway URL: {e}")))?;
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs.iter());
        }
        Ok(url)
    }

    async fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let bearer = match self.token.read().await.as_ref() {
            Some(token) => token.clone(),
            None => self.anon_key.clone(),
        };
        let profile_header = if method == Method::GET {
            "Accept-Profile"
        } else {
            "Content-Profile"
        };

        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {bearer}"))
            .header(profile_header, &self.schema)
    }

    fn id_filter(id: &str) -> Vec<(String, String)> {
        vec![("id".to_string(), format!("eq.{id}"))]
    }
}

#[async_trait]
impl Gateway for RestGateway {
    async fn select(&self, query: &SelectQuery) -> AppResult<QueryPage> {
        let pairs = query_pairs(query);
        let url = self.table_url(&query.table, &pairs)?;
        debug!(table = %query.table, %url, "Gateway select");

        let mut request = self.request(Method::GET, url).await;
        if let Some((from, to)) = query.range {
            request = request
                .header("Range-Unit", "items")
                .header("Range", range_header(from, to));
        }
        if query.count_exact {
            request = request.header("Prefer", "count=exact");
        }

        let response = check(send(request).await?).await?;
        let total = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range);
        let rows = rows(response).await?;

        Ok(QueryPage {
            total: if query.count_exact {
                total.or(Some(rows.len() as u64))
            } else {
                None
            },
            rows,
        })
    }

    async fn insert(&self, table: &str, row: Value) -> AppResult<Value> {
        let url = self.table_url(table, &[])?;
        let request = self
            .request(Method::POST, url)
            .await
            .header("Prefer", "return=representation")
            .json(&row);

        let response = check(send(request).await?).await?;
        first_row(rows(response).await?, table)
    }

    async fn update(&self, table: &str, id: &str, row: Value) -> AppResult<Value> {
        let url = self.table_url(table, &Self::id_filter(id))?;
        let request = self
            .request(Method::PATCH, url)
            .await
            .header("Prefer", "return=representation")
            .json(&row);

        let response = check(send(request).await?).await?;
        first_row(rows(response).await?, table)
    }

    async fn delete(&self, table: &str, id: &str) -> AppResult<()> {
        let url = self.table_url(table, &Self::id_filter(id))?;
        let request = self.request(Method::DELETE, url).await;
        check(send(request).await?).await?;
        Ok(())
    }
}

pub(crate) async fn send(request: RequestBuilder) -> AppResult<Response> {
    request.send().await.map_err(|e| {
        let kind = if e.is_timeout() {
            "Gateway request timed out"
        } else {
            "Gateway request failed"
        };
        AppError::with_source(ErrorKind::Gateway, kind, e)
    })
}

/// Map a non-success response to an [`AppError`] carrying the server's message.
pub(crate) async fn check(response: Response) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| {
            ["message", "msg", "error_description", "error"]
                .iter()
                .find_map(|key| v.get(key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| format!("HTTP {status}"));

    let kind = match status {
        StatusCode::UNAUTHORIZED => ErrorKind::Authentication,
        StatusCode::FORBIDDEN => ErrorKind::Authorization,
        StatusCode::NOT_FOUND => ErrorKind::NotFound,
        StatusCode::CONFLICT => ErrorKind::Conflict,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ErrorKind::Validation,
        _ => ErrorKind::Gateway,
    };
    Err(AppError::new(kind, message))
}

async fn rows(response: Response) -> AppResult<Vec<Value>> {
    let body: Value = response
        .json()
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Serialization, "Invalid gateway response", e))?;
    Ok(match body {
        Value::Array(rows) => rows,
        Value::Null => Vec::new(),
        other => vec![other],
    })
}

fn first_row(rows: Vec<Value>, table: &str) -> AppResult<Value> {
    rows.into_iter()
        .next()
        .ok_or_else(|| AppError::not_found(format!("No {table} row returned")))
}
