//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use treetag_core::config::AppConfig;
use treetag_core::error::AppError;
use treetag_core::types::pagination::MAX_PAGE_SIZE;

use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Validate the loaded configuration
    Validate,
    /// Generate a default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config/generated.toml")]
        output: String,
    },
}

/// Execute config commands
pub async fn execute(
    args: &ConfigArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let mut shown = config.clone();
            shown.gateway.anon_key = mask_key(&shown.gateway.anon_key);
            output::print_item(&shown, format);
        }
        ConfigCommand::Validate => {
            let problems = problems(config);
            if !problems.is_empty() {
                for problem in &problems {
                    output::print_error(problem);
                }
                return Err(AppError::configuration(format!(
                    "{} configuration problem(s)",
                    problems.len()
                )));
            }
            output::print_success("Configuration is valid");
            output::print_kv("Gateway", &config.gateway.base_url);
            output::print_kv("Public URL", &config.app.public_base_url);
            output::print_kv("Local state", &config.local.state_file);
            if config.gateway.anon_key.is_empty() {
                output::print_warning("gateway.anon_key is empty; requests will be anonymous");
            }
        }
        ConfigCommand::Generate { output: out_path } => {
            let default_config = include_str!("../../config/default.toml");

            if let Some(parent) = std::path::Path::new(out_path).parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(out_path, default_config).await?;

            output::print_success(&format!("Default config written to '{out_path}'"));
        }
    }

    Ok(())
}

/// Keep the first few characters of a key for display
fn mask_key(key: &str) -> String {
    if key.chars().count() <= 8 {
        return "*".repeat(key.chars().count());
    }
    let prefix: String = key.chars().take(6).collect();
    format!("{prefix}****")
}

fn problems(config: &AppConfig) -> Vec<String> {
    let mut problems = Vec::new();
    for (key, url) in [
        ("gateway.base_url", &config.gateway.base_url),
        ("app.public_base_url", &config.app.public_base_url),
    ] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            problems.push(format!("{key} must be an http(s) URL, got '{url}'"));
        }
    }

    let query = &config.query;
    if query.page_size_options.is_empty() {
        problems.push("query.page_size_options must not be empty".to_string());
    } else if !query.page_size_options.contains(&query.default_page_size) {
        problems.push(format!(
            "query.default_page_size {} is not one of {:?}",
            query.default_page_size, query.page_size_options
        ));
    }
    if query.page_size_options.contains(&0) {
        problems.push("query.page_size_options must be positive".to_string());
    }
    if query.page_size_options.iter().any(|&size| size > MAX_PAGE_SIZE) {
        problems.push(format!("query.page_size_options must not exceed {MAX_PAGE_SIZE}"));
    }
    if config.local.state_file.trim().is_empty() {
        problems.push("local.state_file must be set".to_string());
    }
    problems
}
