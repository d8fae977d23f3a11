//! Public URLs and scan rewards.

use serde::{Deserialize, Serialize};

/// Application-level settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSection {
    /// Public origin of the web app; QR tags point at `{public_base_url}/tree/{id}`.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Points awarded for each recorded scan.
    #[serde(default = "default_points_per_scan")]
    pub points_per_scan: u64,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            public_base_url: default_public_base_url(),
            points_per_scan: default_points_per_scan(),
        }
    }
}

fn default_public_base_url() -> String {
    "http://localhost:5173".to_string()
}

fn default_points_per_scan() -> u64 {
    10
}
