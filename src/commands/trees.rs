//! Tree catalog and field record commands.

use std::sync::Arc;

use clap::{Args, Subcommand};
use dialoguer::{Input, Select};
use serde::Serialize;
use tabled::Tabled;

use treetag_core::error::AppError;
use treetag_core::traits::position::Position;
use treetag_entity::tree::{FieldRecord, Rank, RecordKind, TreeRecord};
use treetag_service::autocomplete::{Hydration, SuggestPhase};
use treetag_service::list::Collection;
use treetag_service::{
    Autocomplete, LocationService, TemplateHydrator, TreeForm, TreeNameSource, nearest_first,
};

use crate::output::{self, OutputFormat};

use super::listing::{self, ListArgs};
use super::{Context, PromptConfirm, prompt_error};

/// Arguments for tree commands
#[derive(Debug, Args)]
pub struct TreesArgs {
    /// Tree subcommand
    #[command(subcommand)]
    pub command: TreesCommand,
}

/// Tree subcommands
#[derive(Debug, Subcommand)]
pub enum TreesCommand {
    /// List catalog entries, or placed trees with --field
    List {
        /// List field records instead of the catalog
        #[arg(long)]
        field: bool,
        /// Exact status filter (field records only)
        #[arg(long)]
        status: Option<String>,
        /// Search, sort, and paging
        #[command(flatten)]
        list: ListArgs,
    },
    /// Show a placed tree
    Show {
        /// Field record id (or a scanned tag URL)
        id: String,
    },
    /// Add a catalog entry interactively
    Create,
    /// Place a tree of a catalog kind at a position
    Place {
        /// Common name of the catalog entry
        #[arg(short, long)]
        name: String,
        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: String,
        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lng: String,
        /// Location name; created when it does not exist
        #[arg(short, long)]
        location: Option<String>,
        /// Initial status
        #[arg(long)]
        status: Option<String>,
    },
    /// Change a placed tree's status
    Status {
        /// Field record id
        id: String,
        /// New status
        status: String,
    },
    /// Delete a catalog entry, or a placed tree with --field
    Delete {
        /// Row id
        id: String,
        /// Delete a field record
        #[arg(long)]
        field: bool,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Placed trees ordered by distance from a point
    Nearby {
        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        /// Maximum rows
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
}

/// Nearby tree row for table output
#[derive(Debug, Serialize, Tabled)]
struct NearbyRow {
    /// Field record id
    id: String,
    /// Common name
    name: String,
    /// Location
    location: String,
    /// Distance
    distance: String,
}

/// Execute tree commands
pub async fn execute(args: &TreesArgs, ctx: &Context, format: OutputFormat) -> Result<(), AppError> {
    let trees = ctx.trees();

    match &args.command {
        TreesCommand::List { field, status, list } => {
            let collection = if *field {
                Collection::Field
            } else {
                Collection::Classification
            };
            let snapshot = listing::fetch(ctx, collection, list, status.clone()).await?;
            listing::print(&snapshot, format);
        }
        TreesCommand::Show { id } => {
            let id = treetag_service::QrPayload::parse(id)?;
            let record = trees.fetch_field_record(&id).await?;
            match format {
                OutputFormat::Json => output::print_item(&record, format),
                OutputFormat::Table => print_field_record(&record),
            }
        }
        TreesCommand::Create => {
            ctx.require_admin()?;
            let saved = create_interactive(ctx).await?;
            output::print_success(&format!(
                "Created '{}' ({})",
                saved.profile().common_name,
                saved.id()
            ));
        }
        TreesCommand::Place {
            name,
            lat,
            lng,
            location,
            status,
        } => {
            ctx.require_admin()?;
            let form = TreeForm::new_field_record();
            let hydrator = TemplateHydrator::new(trees.clone());
            if hydrator.apply(&form, name).await != Hydration::Merged {
                if let Some(notice) = form.notice() {
                    output::print_warning(&notice);
                }
            }

            form.set_latitude(lat);
            form.set_longitude(lng);
            if let Some(status) = status {
                form.set_status(status);
            }
            if let Some(name) = location {
                let location = LocationService::new(ctx.gateway.clone())
                    .find_or_create(name)
                    .await?;
                form.set_location(&location.name);
                form.set_location_id(Some(location.id));
            }

            let saved = form.submit(|draft| async move { trees.save(&draft).await }).await?;
            output::print_success(&format!("Placed '{}' as {}", saved.profile().common_name, saved.id()));
        }
        TreesCommand::Status { id, status } => {
            ctx.require_admin()?;
            let record = trees.fetch_field_record(id).await?;
            let form = TreeForm::edit(&TreeRecord::Field(record));
            form.set_status(status);
            form.submit(|draft| async move { trees.save(&draft).await }).await?;
            output::print_success(&format!("Tree {id} is now '{status}'"));
        }
        TreesCommand::Delete { id, field, yes } => {
            ctx.require_admin()?;
            let kind = if *field {
                RecordKind::Field
            } else {
                RecordKind::Classification
            };
            let confirm = PromptConfirm { assume_yes: *yes };
            if trees.delete_tree(kind, id, &confirm).await? {
                output::print_success(&format!("Deleted tree {id}"));
            } else {
                output::print_warning("Nothing deleted");
            }
        }
        TreesCommand::Nearby { lat, lng, limit } => {
            let origin = Position {
                latitude: *lat,
                longitude: *lng,
                accuracy_m: None,
            };
            let rows: Vec<NearbyRow> = nearest_first(trees.field_records().await?, origin)
                .into_iter()
                .take(*limit)
                .map(|n| NearbyRow {
                    id: n.record.id,
                    name: n.record.profile.common_name,
                    location: n.record.coordinates.location,
                    distance: format!("{:.2} km", n.distance_km),
                })
                .collect();
            output::print_list(&rows, format);
        }
    }

    Ok(())
}

fn print_field_record(record: &FieldRecord) {
    let profile = &record.profile;
    println!("{}", profile.common_name);
    output::print_kv("Id", &record.id);
    output::print_kv("Scientific name", &profile.scientific_name);
    for rank in Rank::ALL {
        output::print_kv(rank.as_str(), profile.taxonomy.get(rank));
    }
    output::print_kv("Region", &profile.endemic.region);
    output::print_kv("Countries", &profile.endemic.countries.join(", "));
    output::print_kv("Provinces", &profile.endemic.provinces.join(", "));
    output::print_kv("Location", &record.coordinates.location);
    output::print_kv(
        "Coordinates",
        &format!("{:.6}, {:.6}", record.coordinates.latitude, record.coordinates.longitude),
    );
    output::print_kv("Status", &record.status);
    if !profile.description.is_empty() {
        output::print_kv("Description", &profile.description);
    }
    for characteristic in &profile.characteristics {
        println!("    - {characteristic}");
    }
}

/// Walk the catalog form: name with suggestions, then every other field
/// prefilled from whatever the picked template supplied.
async fn create_interactive(ctx: &Context) -> Result<TreeRecord, AppError> {
    let trees = ctx.trees();
    let form = TreeForm::new_classification();
    let names = Autocomplete::new(
        Arc::new(TreeNameSource::new(ctx.gateway.clone(), &ctx.config.query)),
        &ctx.config.query,
    );
    let hydrator = TemplateHydrator::new(trees.clone());

    names.focus().await;
    let typed: String = Input::new()
        .with_prompt("Common name")
        .interact_text()
        .map_err(prompt_error)?;
    names.input(&typed).await;

    let picked = match names.settled().await {
        SuggestPhase::Results(options) if !options.is_empty() => {
            let mut items = vec![format!("Use \"{typed}\"")];
            items.extend(options.iter().map(|o| format!("Copy details from {o}")));
            let choice = Select::new()
                .with_prompt("Similar trees")
                .items(&items)
                .default(0)
                .interact()
                .map_err(prompt_error)?;
            choice.checked_sub(1).and_then(|i| options.get(i).cloned())
        }
        _ => None,
    };

    match picked {
        Some(name) => match hydrator.select(&names, &form, &name).await {
            Hydration::Merged => output::print_success(&format!("Copied details from {name}")),
            _ => {
                if let Some(notice) = form.notice() {
                    output::print_warning(&notice);
                }
            }
        },
        None => {
            form.set_common_name(&typed);
        }
    }
    names.teardown();

    let profile = form.draft().profile().clone();
    form.set_scientific_name(&ask("Scientific name", &profile.scientific_name)?);
    for rank in Rank::ALL {
        form.set_rank(rank, &ask(rank.as_str(), profile.taxonomy.get(rank))?);
    }
    form.set_region(&ask("Region", &profile.endemic.region)?);
    form.set_countries(&ask("Countries (comma separated)", &form.countries_text())?);
    form.set_provinces(&ask("Provinces (comma separated)", &form.provinces_text())?);
    form.set_description(&ask("Description", &profile.description)?);

    loop {
        let text = ask("Add characteristic (blank to finish)", "")?;
        if text.trim().is_empty() {
            break;
        }
        form.stage_characteristic(&text);
        form.characteristic_key("Enter");
    }

    if let Some(problem) = form.validation_error() {
        return Err(AppError::validation(problem));
    }
    let trees = &trees;
    form.submit(|draft| async move { trees.save(&draft).await }).await
}

fn ask(prompt: &str, current: &str) -> Result<String, AppError> {
    Input::new()
        .with_prompt(prompt)
        .with_initial_text(current)
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_error)
}
