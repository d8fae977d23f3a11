//! Signed-in session and profile, shared by every controller.

use std::sync::{Arc, Mutex};

use serde_json::json;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use treetag_core::error::AppError;
use treetag_core::events::AuthEvent;
use treetag_core::result::AppResult;
use treetag_core::traits::auth::{AuthProvider, AuthSession};
use treetag_core::traits::gateway::Gateway;
use treetag_core::traits::local_store::LocalStore;
use treetag_core::types::filter::FilterField;
use treetag_core::types::query::SelectQuery;
use treetag_entity::normalize;
use treetag_entity::tables;
use treetag_entity::user::UserProfile;
use treetag_local::keys::AUTH_TOKEN;

/// The signed-in state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// Current session, if signed in.
    pub session: Option<AuthSession>,
    /// Profile of the signed-in user.
    pub profile: Option<UserProfile>,
}

impl SessionState {
    /// Whether someone is signed in.
    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }
}

/// Single source of truth for who is signed in.
///
/// Created once and injected. [`init`](Self::init) loads the current
/// session and starts following auth events; [`sign_out`](Self::sign_out)
/// stops following them and clears local state.
pub struct SessionStore {
    auth: Arc<dyn AuthProvider>,
    gateway: Arc<dyn Gateway>,
    local: Arc<dyn LocalStore>,
    state: watch::Sender<SessionState>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Store with nobody signed in.
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        gateway: Arc<dyn Gateway>,
        local: Arc<dyn LocalStore>,
    ) -> Arc<Self> {
        Arc::new(Self {
            auth,
            gateway,
            local,
            state: watch::channel(SessionState::default()).0,
            listener: Mutex::new(None),
        })
    }

    /// Load the current session and follow auth-state changes.
    pub async fn init(self: &Arc<Self>) -> AppResult<()> {
        let events = self.auth.subscribe();
        let session = self.auth.session().await?;
        self.apply(session).await?;

        let store = Arc::downgrade(self);
        let handle = tokio::spawn(follow(store, events));
        if let Some(previous) = self
            .listener
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(handle)
        {
            previous.abort();
        }
        Ok(())
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Current session.
    pub fn current(&self) -> Option<AuthSession> {
        self.state.borrow().session.clone()
    }

    /// Profile of the signed-in user.
    pub fn user(&self) -> Option<UserProfile> {
        self.state.borrow().profile.clone()
    }

    /// Whether the dashboard should be shown. Presentation only; the
    /// gateway's own policies decide what a user may actually change.
    pub fn is_admin(&self) -> bool {
        self.state
            .borrow()
            .profile
            .as_ref()
            .is_some_and(UserProfile::is_admin)
    }

    /// Watch session changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Email/password sign-in.
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<UserProfile> {
        let session = self.auth.sign_in_with_password(email, password).await?;
        self.apply(Some(session)).await?;
        self.user()
            .ok_or_else(|| AppError::internal("Signed in without a profile"))
    }

    /// URL that starts an OAuth redirect sign-in.
    pub fn oauth_url(&self, provider: &str, redirect_to: &str) -> String {
        self.auth.oauth_authorize_url(provider, redirect_to)
    }

    /// End the session, stop following auth events, and clear local state.
    pub async fn sign_out(&self) -> AppResult<()> {
        if let Some(handle) = self.listener.lock().unwrap_or_else(|e| e.into_inner()).take() {
            handle.abort();
        }
        self.auth.sign_out().await?;
        self.local.clear().await?;
        self.state.send_replace(SessionState::default());
        info!("Session cleared");
        Ok(())
    }

    async fn apply(&self, session: Option<AuthSession>) -> AppResult<()> {
        let Some(session) = session else {
            self.local.remove(AUTH_TOKEN).await?;
            self.state.send_replace(SessionState::default());
            return Ok(());
        };

        self.local.set(AUTH_TOKEN, &session.access_token).await?;
        let profile = self.load_profile(&session).await;
        info!(user_id = %profile.id, admin = profile.is_admin(), "Session active");
        self.state.send_replace(SessionState {
            session: Some(session),
            profile: Some(profile),
        });
        Ok(())
    }

    async fn load_profile(&self, session: &AuthSession) -> UserProfile {
        let query = SelectQuery::table(tables::PROFILES)
            .filter(FilterField::eq("id", &session.user.id))
            .limit(1);

        let from_auth = || {
            normalize::user(&json!({
                "id": session.user.id,
                "email": session.user.email,
                "user_metadata": session.user.user_metadata,
            }))
        };

        match self.gateway.select(&query).await {
            Ok(page) => match page.rows.first() {
                Some(row) => {
                    let mut profile = normalize::user(row);
                    if profile.email.is_empty() {
                        profile.email = session.user.email.clone().unwrap_or_default();
                    }
                    profile
                }
                None => from_auth(),
            },
            Err(e) => {
                warn!(user_id = %session.user.id, error = %e, "Profile lookup failed; using auth metadata");
                from_auth()
            }
        }
    }
}

async fn follow(store: std::sync::Weak<SessionStore>, mut events: broadcast::Receiver<AuthEvent>) {
    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Missed auth events");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };
        let Some(store) = store.upgrade() else {
            break;
        };

        debug!(?event, "Auth state changed");
        let session = event.session().cloned();
        if let Err(e) = store.apply(session).await {
            warn!(error = %e, "Failed to apply auth state change");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use treetag_core::traits::auth::AuthProvider;
    use treetag_gateway::{MemoryAuth, MemoryGateway};
    use treetag_local::MemoryStore;

    #[tokio::test]
    async fn test_sign_in_mirrors_token_and_loads_role() {
        let auth = Arc::new(MemoryAuth::new());
        let user = auth.register("ana@example.org", "pw", json!({ "full_name": "Ana Cruz" }));
        let gateway = Arc::new(MemoryGateway::new());
        gateway.seed(tables::PROFILES, vec![json!({ "id": user.id, "role": "admin" })]);
        let local = Arc::new(MemoryStore::new());

        let store = SessionStore::new(auth, gateway, local.clone());
        store.init().await.expect("init");
        assert!(!store.state().is_signed_in());

        let profile = store.sign_in("ana@example.org", "pw").await.expect("sign in");
        assert!(store.is_admin());
        assert_eq!(profile.email, "ana@example.org");
        let token = local.get(AUTH_TOKEN).await.expect("get");
        assert_eq!(token, store.current().map(|s| s.access_token));
    }

    #[tokio::test]
    async fn test_external_sign_out_event_clears_state() {
        let auth = Arc::new(MemoryAuth::new());
        auth.register("ana@example.org", "pw", serde_json::Value::Null);
        let store = SessionStore::new(
            auth.clone(),
            Arc::new(MemoryGateway::new()),
            Arc::new(MemoryStore::new()),
        );
        store.init().await.expect("init");
        store.sign_in("ana@example.org", "pw").await.expect("sign in");
        assert_eq!(store.user().map(|u| u.display_name), Some("ana@example.org".into()));

        let mut changes = store.subscribe();
        auth.sign_out().await.expect("sign out");
        tokio::time::timeout(Duration::from_secs(1), changes.wait_for(|s| !s.is_signed_in()))
            .await
            .expect("event delivered")
            .expect("store alive");
        assert!(!store.is_admin());
    }
}
