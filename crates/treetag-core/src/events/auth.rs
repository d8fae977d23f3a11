//! Auth-state change notifications.

use serde::{Deserialize, Serialize};

use crate::traits::auth::AuthSession;

/// A change in the signed-in state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AuthEvent {
    /// A session was established.
    SignedIn {
        /// The new session.
        session: AuthSession,
    },
    /// The access token was replaced.
    TokenRefreshed {
        /// The refreshed session.
        session: AuthSession,
    },
    /// The session ended.
    SignedOut,
}

impl AuthEvent {
    /// The session carried by this event, if any.
    pub fn session(&self) -> Option<&AuthSession> {
        match self {
            Self::SignedIn { session } | Self::TokenRefreshed { session } => Some(session),
            Self::SignedOut => None,
        }
    }
}
