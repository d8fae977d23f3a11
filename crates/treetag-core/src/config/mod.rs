//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field carries a default so an empty file loads.

pub mod app;
pub mod auth;
pub mod gateway;
pub mod local;
pub mod logging;
pub mod query;

use serde::{Deserialize, Serialize};

use self::app::AppSection;
use self::auth::AuthConfig;
use self::gateway::GatewayConfig;
use self::local::LocalConfig;
use self::logging::LoggingConfig;
use self::query::QueryConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Hosted backend connection settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// Sign-in settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// List, search, and suggestion tuning.
    #[serde(default)]
    pub query: QueryConfig,
    /// Public URLs and scan rewards.
    #[serde(default)]
    pub app: AppSection,
    /// Local persisted state.
    #[serde(default)]
    pub local: LocalConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `base` (e.g. `config/default`) with an environment-specific
    /// overlay `config/{env}` and environment variables prefixed with
    /// `TREETAG_` (nested keys separated by `__`).
    pub fn load(base: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(base).required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("TREETAG")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = serde_json::from_str("{}").expect("defaults");
        assert_eq!(config.query.debounce_ms, 300);
        assert_eq!(config.query.default_page_size, 20);
        assert_eq!(config.query.tree_suggestion_limit, 3);
        assert_eq!(config.query.location_suggestion_limit, 5);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.local.state_file, "data/local_state.json");
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"query": {"debounce_ms": 50}}"#).expect("partial");
        assert_eq!(config.query.debounce_ms, 50);
        assert_eq!(config.query.page_size_options, vec![10, 20, 50, 100]);
    }
}
