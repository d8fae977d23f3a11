//! Sign-in configuration.

use serde::{Deserialize, Serialize};

/// Authentication settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Where the OAuth provider sends the browser after sign-in.
    #[serde(default = "default_redirect")]
    pub oauth_redirect_url: String,
    /// OAuth provider used when none is given.
    #[serde(default = "default_provider")]
    pub default_oauth_provider: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            oauth_redirect_url: default_redirect(),
            default_oauth_provider: default_provider(),
        }
    }
}

fn default_redirect() -> String {
    "http://localhost:5173/dashboard".to_string()
}

fn default_provider() -> String {
    "google".to_string()
}
