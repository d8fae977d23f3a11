//! Shared list arguments and rendering for the dashboard collections.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use treetag_core::error::AppError;
use treetag_service::list::{
    Collection, CreatedWithin, ListController, ListEntity, ListSnapshot, ListState, SortKey,
};

use crate::output::{self, OutputFormat};

use super::Context;

/// Search, sort, page, and facet options.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Case-insensitive substring match on the name column
    #[arg(short, long)]
    pub search: Option<String>,

    /// Ordering: name-asc, name-desc, recent, oldest
    #[arg(long, default_value = "recent")]
    pub sort: SortKey,

    /// Page number (1-based)
    #[arg(short, long, default_value_t = 1)]
    pub page: u64,

    /// Rows per page (one of the configured options)
    #[arg(long)]
    pub page_size: Option<u64>,

    /// Created within: day, week, month, year
    #[arg(long)]
    pub within: Option<CreatedWithin>,
}

/// Display row for table output
#[derive(Debug, Serialize, Tabled)]
struct EntityRow {
    /// Row id
    id: String,
    /// Display label
    name: String,
    /// Secondary detail
    detail: String,
    /// Created at
    created_at: String,
}

impl From<&ListEntity> for EntityRow {
    fn from(entity: &ListEntity) -> Self {
        let detail = match entity {
            ListEntity::Tree(tree) => match tree.coordinates() {
                Some(c) => format!("{} @ {:.5}, {:.5}", c.location, c.latitude, c.longitude),
                None => tree.profile().scientific_name.clone(),
            },
            ListEntity::Location(_) => String::new(),
            ListEntity::User(user) => format!("{} ({})", user.email, user.role),
        };
        Self {
            id: entity.id(),
            name: entity.label().to_string(),
            detail,
            created_at: entity
                .created_at()
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
        }
    }
}

/// Fetch one page of `collection` with the given options.
pub async fn fetch(
    ctx: &Context,
    collection: Collection,
    args: &ListArgs,
    status: Option<String>,
) -> Result<ListSnapshot, AppError> {
    let mut state = ListState::new(
        collection,
        args.page_size.unwrap_or(ctx.config.query.default_page_size),
    );
    state.search = args.search.clone().unwrap_or_default();
    state.sort = args.sort;
    state.page = args.page;
    state.facets.status = status;
    state.facets.created_within = args.within;

    let list = ListController::with_state(ctx.gateway.clone(), &ctx.config.query, state)?;
    Ok(list.refresh().await)
}

/// Print a page and its range summary.
pub fn print(snapshot: &ListSnapshot, format: OutputFormat) {
    let rows: Vec<EntityRow> = snapshot.page.items.iter().map(EntityRow::from).collect();
    output::print_list(&rows, format);
    if format == OutputFormat::Table {
        println!(
            "{}  (page {} of {})",
            snapshot.page.summary(),
            snapshot.page.page,
            snapshot.page.total_pages.max(1)
        );
    }
}
