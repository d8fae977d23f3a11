//! List, search, and suggestion tuning.

use serde::{Deserialize, Serialize};

/// Timing and sizing for list views and autocomplete lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Settle time before a typed search is sent, in milliseconds.
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,
    /// Page sizes a list view may switch between.
    #[serde(default = "default_page_size_options")]
    pub page_size_options: Vec<u64>,
    /// Page size used when a list view opens.
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    /// How many recently created names to offer before typing starts.
    #[serde(default = "default_recent_limit")]
    pub recent_limit: u64,
    /// Maximum tree-name suggestions per lookup.
    #[serde(default = "default_tree_limit")]
    pub tree_suggestion_limit: u64,
    /// Maximum location suggestions per lookup.
    #[serde(default = "default_location_limit")]
    pub location_suggestion_limit: u64,
    /// Delay before a blurred suggestion panel closes, in milliseconds.
    #[serde(default = "default_blur_grace")]
    pub blur_grace_ms: u64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce(),
            page_size_options: default_page_size_options(),
            default_page_size: default_page_size(),
            recent_limit: default_recent_limit(),
            tree_suggestion_limit: default_tree_limit(),
            location_suggestion_limit: default_location_limit(),
            blur_grace_ms: default_blur_grace(),
        }
    }
}

fn default_debounce() -> u64 {
    300
}

fn default_page_size_options() -> Vec<u64> {
    vec![10, 20, 50, 100]
}

fn default_page_size() -> u64 {
    20
}

fn default_recent_limit() -> u64 {
    5
}

fn default_tree_limit() -> u64 {
    3
}

fn default_location_limit() -> u64 {
    5
}

fn default_blur_grace() -> u64 {
    150
}
