//! Authentication provider trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::events::AuthEvent;
use crate::result::AppResult;

/// The identity attached to a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Auth identity; profile rows share this id.
    pub id: String,
    /// Email address, when the provider exposes one.
    #[serde(default)]
    pub email: Option<String>,
    /// Free-form metadata supplied at sign-up or by the OAuth provider.
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

/// A signed-in session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    /// Bearer token for gateway requests.
    pub access_token: String,
    /// Token used to obtain a fresh access token.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// When the access token stops being accepted.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// The signed-in identity.
    pub user: AuthUser,
}

/// Sign-in, session retrieval, sign-out, and auth-state notifications.
#[async_trait]
pub trait AuthProvider: Send + Sync + 'static {
    /// Email/password sign-in.
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<AuthSession>;

    /// URL to send the browser to for an OAuth redirect sign-in.
    fn oauth_authorize_url(&self, provider: &str, redirect_to: &str) -> String;

    /// The current session, if any.
    async fn session(&self) -> AppResult<Option<AuthSession>>;

    /// End the current session.
    async fn sign_out(&self) -> AppResult<()>;

    /// Stream of auth-state changes.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}
