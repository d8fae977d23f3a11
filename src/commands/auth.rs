//! Sign-in commands.

use clap::{Args, Subcommand};
use dialoguer::Password;

use treetag_core::error::AppError;

use crate::output::{self, OutputFormat};

use super::{Context, prompt_error};

/// Arguments for auth commands
#[derive(Debug, Args)]
pub struct AuthArgs {
    /// Auth subcommand
    #[command(subcommand)]
    pub command: AuthCommand,
}

/// Auth subcommands
#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Sign in with email and password
    Login {
        /// Account email
        email: String,
    },
    /// Sign out and clear local state
    Logout,
    /// Print the URL that starts an OAuth sign-in
    OauthUrl {
        /// Provider name (defaults to the configured one)
        #[arg(short, long)]
        provider: Option<String>,
    },
    /// Show the signed-in user
    Whoami,
}

/// Execute auth commands
pub async fn execute(args: &AuthArgs, ctx: &Context, format: OutputFormat) -> Result<(), AppError> {
    match &args.command {
        AuthCommand::Login { email } => {
            let password = Password::new()
                .with_prompt("Password")
                .interact()
                .map_err(prompt_error)?;
            let profile = ctx.session.sign_in(email, &password).await?;
            output::print_success(&format!("Signed in as {}", profile.display_name));
            if profile.is_admin() {
                output::print_kv("Role", "admin");
            }
        }
        AuthCommand::Logout => {
            ctx.session.sign_out().await?;
            output::print_success("Signed out");
        }
        AuthCommand::OauthUrl { provider } => {
            let provider = provider
                .as_deref()
                .unwrap_or(&ctx.config.auth.default_oauth_provider);
            println!(
                "{}",
                ctx.session.oauth_url(provider, &ctx.config.auth.oauth_redirect_url)
            );
        }
        AuthCommand::Whoami => match ctx.session.user() {
            Some(profile) => match format {
                OutputFormat::Json => output::print_item(&profile, format),
                OutputFormat::Table => {
                    output::print_kv("Id", &profile.id);
                    output::print_kv("Name", &profile.display_name);
                    output::print_kv("Email", &profile.email);
                    output::print_kv("Role", profile.role.as_str());
                }
            },
            None => output::print_warning("Not signed in"),
        },
    }

    Ok(())
}
