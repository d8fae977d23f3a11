//! CLI command definitions and dispatch.

pub mod auth;
pub mod config;
pub mod listing;
pub mod locations;
pub mod qr;
pub mod scan;
pub mod trees;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use treetag_core::config::AppConfig;
use treetag_core::error::AppError;
use treetag_core::traits::gateway::Gateway;
use treetag_core::traits::local_store::LocalStore;
use treetag_gateway::{RestAuth, RestGateway};
use treetag_local::FileStore;
use treetag_local::keys::AUTH_TOKEN;
use treetag_service::{Confirm, SessionStore, TreeService};

use crate::output::OutputFormat;

/// TreeTag: tree registry administration and field scanning
#[derive(Debug, Parser)]
#[command(name = "treetag", version, about, long_about = None)]
pub struct Cli {
    /// Base configuration file (extension optional)
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Environment overlay loaded from config/{env}
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Tree catalog and field records
    Trees(trees::TreesArgs),
    /// Location management
    Locations(locations::LocationsArgs),
    /// User profiles
    Users(users::UsersArgs),
    /// QR tags
    Qr(qr::QrArgs),
    /// Scan a tag and track progress
    Scan(scan::ScanArgs),
    /// Sign in and out
    Auth(auth::AuthArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        // Config commands must work without a reachable backend.
        if let Commands::Config(args) = &self.command {
            return config::execute(args, &config, self.format).await;
        }

        let ctx = Context::connect(config).await?;
        match &self.command {
            Commands::Trees(args) => trees::execute(args, &ctx, self.format).await,
            Commands::Locations(args) => locations::execute(args, &ctx, self.format).await,
            Commands::Users(args) => users::execute(args, &ctx, self.format).await,
            Commands::Qr(args) => qr::execute(args, &ctx).await,
            Commands::Scan(args) => scan::execute(args, &ctx, self.format).await,
            Commands::Auth(args) => auth::execute(args, &ctx, self.format).await,
            Commands::Config(args) => config::execute(args, &ctx.config, self.format).await,
        }
    }
}

/// Everything a command needs, wired from configuration.
pub struct Context {
    /// Loaded configuration.
    pub config: AppConfig,
    /// Table client.
    pub gateway: Arc<dyn Gateway>,
    /// Persisted local state.
    pub local: Arc<dyn LocalStore>,
    /// Session store.
    pub session: Arc<SessionStore>,
}

impl Context {
    /// Build clients and restore a previously saved session.
    pub async fn connect(config: AppConfig) -> Result<Self, AppError> {
        let gateway = Arc::new(RestGateway::new(&config.gateway)?);
        let auth = Arc::new(RestAuth::new(&config.gateway, gateway.token_slot())?);
        let local: Arc<dyn LocalStore> = Arc::new(FileStore::open(&config.local.state_file).await?);

        if let Some(token) = local.get(AUTH_TOKEN).await? {
            match auth.restore(&token).await? {
                Some(_) => debug!("Restored saved session"),
                None => info!("Saved session expired; sign in again"),
            }
        }

        let gateway: Arc<dyn Gateway> = gateway;
        let session = SessionStore::new(auth, gateway.clone(), local.clone());
        session.init().await?;

        Ok(Self {
            config,
            gateway,
            local,
            session,
        })
    }

    /// Tree reads and writes.
    pub fn trees(&self) -> TreeService {
        TreeService::new(self.gateway.clone())
    }

    /// Fail unless an admin is signed in.
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.session.current().is_none() {
            return Err(AppError::authentication(
                "Not signed in. Run `treetag auth login` first",
            ));
        }
        if !self.session.is_admin() {
            return Err(AppError::authorization("This command needs an admin account"));
        }
        Ok(())
    }
}

/// Confirmation on the terminal, skipped with `--yes`.
pub struct PromptConfirm {
    /// Proceed without asking.
    pub assume_yes: bool,
}

#[async_trait]
impl Confirm for PromptConfirm {
    async fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}

/// Map a prompt failure (closed terminal, interrupted input).
pub fn prompt_error(e: dialoguer::Error) -> AppError {
    AppError::internal(format!("Prompt failed: {e}"))
}
