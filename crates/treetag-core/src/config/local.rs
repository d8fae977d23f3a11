//! Local persisted state configuration.

use serde::{Deserialize, Serialize};

/// Where the small key/value state (token mirror, scan counter) lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalConfig {
    /// Path to the JSON state file.
    #[serde(default = "default_state_file")]
    pub state_file: String,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            state_file: default_state_file(),
        }
    }
}

fn default_state_file() -> String {
    "data/local_state.json".to_string()
}
