//! In-process auth provider with registered email/password users.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::info;
use uuid::Uuid;

use treetag_core::error::AppError;
use treetag_core::events::AuthEvent;
use treetag_core::result::AppResult;
use treetag_core::traits::auth::{AuthProvider, AuthSession, AuthUser};

const EVENT_BUFFER: usize = 16;

#[derive(Debug, Clone)]
struct Account {
    password: String,
    user: AuthUser,
}

/// Auth provider that keeps accounts and the session in memory.
#[derive(Debug)]
pub struct MemoryAuth {
    accounts: Mutex<HashMap<String, Account>>,
    session: Mutex<Option<AuthSession>>,
    events: broadcast::Sender<AuthEvent>,
}

impl Default for MemoryAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAuth {
    /// Provider with no accounts.
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            session: Mutex::new(None),
            events: broadcast::channel(EVENT_BUFFER).0,
        }
    }

    /// Register an account and return its identity.
    pub fn register(&self, email: &str, password: &str, user_metadata: Value) -> AuthUser {
        let user = AuthUser {
            id: Uuid::new_v4().to_string(),
            email: Some(email.to_string()),
            user_metadata,
        };
        self.accounts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(
                email.to_lowercase(),
                Account {
                    password: password.to_string(),
                    user: user.clone(),
                },
            );
        user
    }
}

#[async_trait]
impl AuthProvider for MemoryAuth {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        let account = self
            .accounts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&email.to_lowercase())
            .cloned();

        let account = match account {
            Some(a) if a.password == password => a,
            _ => return Err(AppError::authentication("Sign-in failed: Invalid login credentials")),
        };

        let session = AuthSession {
            access_token: Uuid::new_v4().simple().to_string(),
            refresh_token: None,
            expires_at: None,
            user: account.user,
        };
        *self.session.lock().unwrap_or_else(|e| e.into_inner()) = Some(session.clone());
        info!(user_id = %session.user.id, "Signed in with password");
        let _ = self.events.send(AuthEvent::SignedIn {
            session: session.clone(),
        });
        Ok(session)
    }

    fn oauth_authorize_url(&self, provider: &str, redirect_to: &str) -> String {
        format!("memory://authorize?provider={provider}&redirect_to={redirect_to}")
    }

    async fn session(&self) -> AppResult<Option<AuthSession>> {
        Ok(self.session.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    async fn sign_out(&self) -> AppResult<()> {
        *self.session.lock().unwrap_or_else(|e| e.into_inner()) = None;
        let _ = self.events.send(AuthEvent::SignedOut);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}
