//! Auth API client: password and OAuth sign-in, session, sign-out.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::{RwLock, broadcast};
use tracing::{info, warn};

use treetag_core::config::gateway::GatewayConfig;
use treetag_core::error::{AppError, ErrorKind};
use treetag_core::events::AuthEvent;
use treetag_core::result::AppResult;
use treetag_core::traits::auth::{AuthProvider, AuthSession, AuthUser};

use super::TokenSlot;
use super::client::{check, send};

/// Buffered auth events per subscriber.
const EVENT_BUFFER: usize = 16;

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    user: AuthUser,
}

impl TokenResponse {
    fn into_session(self) -> AuthSession {
        AuthSession {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: self
                .expires_in
                .map(|secs| Utc::now() + chrono::Duration::seconds(secs)),
            user: self.user,
        }
    }
}

/// Client for a GoTrue-style auth API under `{base_url}/auth/v1`.
#[derive(Debug)]
pub struct RestAuth {
    client: Client,
    auth_url: String,
    anon_key: String,
    session: RwLock<Option<AuthSession>>,
    token: TokenSlot,
    events: broadcast::Sender<AuthEvent>,
}

impl RestAuth {
    /// Create an auth client that mirrors the access token into `token`.
    pub fn new(config: &GatewayConfig, token: TokenSlot) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            client,
            auth_url: format!("{}/auth/v1", config.base_url.trim_end_matches('/')),
            anon_key: config.anon_key.clone(),
            session: RwLock::new(None),
            token,
            events: broadcast::channel(EVENT_BUFFER).0,
        })
    }

    /// Rebuild a session from a previously mirrored access token.
    ///
    /// The token is validated against the user endpoint; an expired or
    /// revoked token yields `Ok(None)`.
    pub async fn restore(&self, access_token: &str) -> AppResult<Option<AuthSession>> {
        let response = send(
            self.client
                .get(format!("{}/user", self.auth_url))
                .header("apikey", &self.anon_key)
                .header("Authorization", format!("Bearer {access_token}")),
        )
        .await?;

        let response = match check(response).await {
            Ok(r) => r,
            Err(e) if e.kind == ErrorKind::Authentication => return Ok(None),
            Err(e) => return Err(e),
        };

        let user: AuthUser = response
            .json()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Serialization, "Invalid user response", e))?;
        let session = AuthSession {
            access_token: access_token.to_string(),
            refresh_token: None,
            expires_at: None,
            user,
        };
        self.install(session.clone(), false).await;
        Ok(Some(session))
    }

    async fn token_grant(&self, grant_type: &str, body: serde_json::Value) -> AppResult<AuthSession> {
        let response = send(
            self.client
                .post(format!("{}/token?grant_type={grant_type}", self.auth_url))
                .header("apikey", &self.anon_key)
                .json(&body),
        )
        .await?;

        let response = check(response).await.map_err(|e| match e.kind {
            ErrorKind::Validation | ErrorKind::Authentication => {
                AppError::authentication(format!("Sign-in failed: {}", e.message))
            }
            _ => e,
        })?;

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Serialization, "Invalid token response", e))?;
        Ok(token.into_session())
    }

    async fn refresh(&self, refresh_token: &str) -> AppResult<AuthSession> {
        let session = self
            .token_grant("refresh_token", json!({ "refresh_token": refresh_token }))
            .await?;
        self.install(session.clone(), true).await;
        Ok(session)
    }

    async fn install(&self, session: AuthSession, refreshed: bool) {
        *self.token.write().await = Some(session.access_token.clone());
        *self.session.write().await = Some(session.clone());
        let event = if refreshed {
            AuthEvent::TokenRefreshed { session }
        } else {
            AuthEvent::SignedIn { session }
        };
        let _ = self.events.send(event);
    }

    async fn clear(&self) {
        *self.token.write().await = None;
        *self.session.write().await = None;
        let _ = self.events.send(AuthEvent::SignedOut);
    }
}

fn expired(expires_at: Option<DateTime<Utc>>) -> bool {
    expires_at.is_some_and(|at| at <= Utc::now())
}

#[async_trait]
impl AuthProvider for RestAuth {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        let session = self
            .token_grant("password", json!({ "email": email, "password": password }))
            .await?;
        info!(user_id = %session.user.id, "Signed in with password");
        self.install(session.clone(), false).await;
        Ok(session)
    }

    fn oauth_authorize_url(&self, provider: &str, redirect_to: &str) -> String {
        match Url::parse_with_params(
            &format!("{}/authorize", self.auth_url),
            &[("provider", provider), ("redirect_to", redirect_to)],
        ) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}/authorize?provider={provider}", self.auth_url),
        }
    }

    async fn session(&self) -> AppResult<Option<AuthSession>> {
        let current = self.session.read().await.clone();
        match current {
            Some(session) if expired(session.expires_at) => match session.refresh_token {
                Some(refresh_token) => self.refresh(&refresh_token).await.map(Some),
                None => {
                    self.clear().await;
                    Ok(None)
                }
            },
            other => Ok(other),
        }
    }

    async fn sign_out(&self) -> AppResult<()> {
        let token = self.token.read().await.clone();
        if let Some(token) = token {
            let request = self
                .client
                .post(format!("{}/logout", self.auth_url))
                .header("apikey", &self.anon_key)
                .header("Authorization", format!("Bearer {token}"));
            let result = match send(request).await {
                Ok(response) => check(response).await.map(|_| ()),
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                warn!(error = %e, "Remote sign-out failed; clearing local session anyway");
            }
        }
        self.clear().await;
        info!("Signed out");
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn auth() -> RestAuth {
        let config = GatewayConfig {
            base_url: "https://demo.example.co/".to_string(),
            ..Default::default()
        };
        RestAuth::new(&config, Arc::new(RwLock::new(None))).expect("client")
    }

    #[test]
    fn test_oauth_url_encodes_redirect() {
        let url = auth().oauth_authorize_url("google", "http://localhost:5173/dashboard");
        assert!(url.starts_with("https://demo.example.co/auth/v1/authorize?provider=google"));
        assert!(url.contains("redirect_to=http%3A%2F%2Flocalhost%3A5173%2Fdashboard"));
    }

    #[tokio::test]
    async fn test_session_starts_empty() {
        assert!(auth().session().await.expect("session").is_none());
    }

    #[test]
    fn test_token_response_into_session() {
        let body = json!({
            "access_token": "at",
            "refresh_token": "rt",
            "expires_in": 3600,
            "user": { "id": "u-1", "email": "ana@example.org" }
        });
        let token: TokenResponse = serde_json::from_value(body).expect("parse");
        let session = token.into_session();
        assert_eq!(session.user.id, "u-1");
        assert!(!expired(session.expires_at));
    }
}
