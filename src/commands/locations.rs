//! Location management commands.

use std::sync::Arc;

use clap::{Args, Subcommand};

use treetag_core::error::AppError;
use treetag_service::autocomplete::SuggestPhase;
use treetag_service::list::Collection;
use treetag_service::{Autocomplete, LocationService, LocationSource};

use crate::output::{self, OutputFormat};

use super::listing::{self, ListArgs};
use super::{Context, PromptConfirm};

/// Arguments for location commands
#[derive(Debug, Args)]
pub struct LocationsArgs {
    /// Location subcommand
    #[command(subcommand)]
    pub command: LocationsCommand,
}

/// Location subcommands
#[derive(Debug, Subcommand)]
pub enum LocationsCommand {
    /// List locations
    List {
        /// Search, sort, and paging
        #[command(flatten)]
        list: ListArgs,
    },
    /// Create a location
    Create {
        /// Location name
        name: String,
    },
    /// Rename a location
    Rename {
        /// Location id
        id: i64,
        /// New name
        name: String,
    },
    /// Delete a location
    Delete {
        /// Location id
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Suggest location names; recent ones when TEXT is shorter than two characters
    Suggest {
        /// Partial name
        #[arg(default_value = "")]
        text: String,
    },
}

/// Execute location commands
pub async fn execute(
    args: &LocationsArgs,
    ctx: &Context,
    format: OutputFormat,
) -> Result<(), AppError> {
    let locations = LocationService::new(ctx.gateway.clone());

    match &args.command {
        LocationsCommand::List { list } => {
            let snapshot = listing::fetch(ctx, Collection::Locations, list, None).await?;
            listing::print(&snapshot, format);
        }
        LocationsCommand::Create { name } => {
            ctx.require_admin()?;
            let location = locations.create(name).await?;
            output::print_success(&format!("Created location '{}' ({})", location.name, location.id));
        }
        LocationsCommand::Rename { id, name } => {
            ctx.require_admin()?;
            let location = locations.rename(*id, name).await?;
            output::print_success(&format!("Location {id} renamed to '{}'", location.name));
        }
        LocationsCommand::Delete { id, yes } => {
            ctx.require_admin()?;
            let confirm = PromptConfirm { assume_yes: *yes };
            if locations.delete(*id, &confirm).await? {
                output::print_success(&format!("Deleted location {id}"));
            } else {
                output::print_warning("Nothing deleted");
            }
        }
        LocationsCommand::Suggest { text } => {
            let field = Autocomplete::new(
                Arc::new(LocationSource::new(ctx.gateway.clone(), &ctx.config.query)),
                &ctx.config.query,
            );
            field.focus().await;
            field.input(text).await;
            let phase = field.settled().await;
            field.teardown();

            match phase {
                SuggestPhase::Results(names) if names.is_empty() => {
                    println!("No suggestions.");
                }
                SuggestPhase::Results(names) => {
                    for name in names {
                        println!("{name}");
                    }
                }
                SuggestPhase::Error(message) => output::print_warning(&message),
                SuggestPhase::Idle | SuggestPhase::Loading => {}
            }
        }
    }

    Ok(())
}
