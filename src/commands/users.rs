//! User profile commands.

use clap::{Args, Subcommand};

use treetag_core::error::AppError;
use treetag_service::UserService;
use treetag_service::list::Collection;

use crate::output::{self, OutputFormat};

use super::listing::{self, ListArgs};
use super::{Context, PromptConfirm};

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UsersArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UsersCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List user profiles
    List {
        /// Search, sort, and paging
        #[command(flatten)]
        list: ListArgs,
    },
    /// Change a user's role
    Role {
        /// User id
        id: String,
        /// New role (e.g. admin, user)
        role: String,
    },
    /// Change a user's display name
    Rename {
        /// User id
        id: String,
        /// New display name
        name: String,
    },
    /// Delete a user profile
    Delete {
        /// User id
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Execute user commands
pub async fn execute(args: &UsersArgs, ctx: &Context, format: OutputFormat) -> Result<(), AppError> {
    ctx.require_admin()?;
    let users = UserService::new(ctx.gateway.clone());

    match &args.command {
        UsersCommand::List { list } => {
            let snapshot = listing::fetch(ctx, Collection::Users, list, None).await?;
            listing::print(&snapshot, format);
        }
        UsersCommand::Role { id, role } => {
            let profile = users.set_role(id, role).await?;
            output::print_success(&format!(
                "{} is now '{}'",
                profile.display_name, profile.role
            ));
        }
        UsersCommand::Rename { id, name } => {
            let profile = users.rename(id, name).await?;
            output::print_success(&format!("User {id} renamed to '{}'", profile.display_name));
        }
        UsersCommand::Delete { id, yes } => {
            let confirm = PromptConfirm { assume_yes: *yes };
            if users.delete(id, &confirm).await? {
                output::print_success(&format!("Deleted user {id}"));
            } else {
                output::print_warning("Nothing deleted");
            }
        }
    }

    Ok(())
}
