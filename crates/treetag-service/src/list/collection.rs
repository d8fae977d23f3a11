//! Collections, sort keys, facets, and query construction.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use treetag_core::error::AppError;
use treetag_core::types::filter::FilterField;
use treetag_core::types::pagination::PageRequest;
use treetag_core::types::query::SelectQuery;
use treetag_core::types::sorting::SortField;
use treetag_entity::location::Location;
use treetag_entity::normalize;
use treetag_entity::tables;
use treetag_entity::tree::TreeRecord;
use treetag_entity::user::UserProfile;

/// A list view over one backing table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    /// Catalog entries.
    #[default]
    Classification,
    /// Physical placements joined with their classification.
    Field,
    /// Named locations.
    Locations,
    /// User profiles.
    Users,
}

impl Collection {
    /// Backing table.
    pub fn table(&self) -> &'static str {
        match self {
            Self::Classification => tables::TREES,
            Self::Field => tables::FIELD_DATA,
            Self::Locations => tables::LOCATIONS,
            Self::Users => tables::PROFILES,
        }
    }

    /// Column projection.
    pub fn columns(&self) -> &'static str {
        match self {
            Self::Field => tables::FIELD_DATA_COLUMNS,
            _ => "*",
        }
    }

    /// Column matched by the search box.
    pub fn search_column(&self) -> &'static str {
        match self {
            Self::Classification => "common_name",
            Self::Field => "trees.common_name",
            Self::Locations => "name",
            Self::Users => "email",
        }
    }

    /// Column ordered by the name sort keys.
    pub fn name_column(&self) -> &'static str {
        match self {
            Self::Classification => "common_name",
            Self::Field => "trees(common_name)",
            Self::Locations => "name",
            Self::Users => "email",
        }
    }

    /// Noun used in prompts and mutation errors.
    pub fn noun(&self) -> &'static str {
        match self {
            Self::Classification | Self::Field => "tree",
            Self::Locations => "location",
            Self::Users => "user",
        }
    }

    /// Whether the status facet applies.
    pub fn has_status(&self) -> bool {
        matches!(self, Self::Field)
    }

    /// Normalize raw rows for this collection.
    pub fn normalize(&self, rows: &[Value]) -> Vec<ListEntity> {
        match self {
            Self::Classification => normalize::classifications(rows)
                .into_iter()
                .map(|r| ListEntity::Tree(TreeRecord::Classification(r)))
                .collect(),
            Self::Field => normalize::field_records(rows)
                .into_iter()
                .map(|r| ListEntity::Tree(TreeRecord::Field(r)))
                .collect(),
            Self::Locations => normalize::locations(rows)
                .into_iter()
                .map(ListEntity::Location)
                .collect(),
            Self::Users => normalize::users(rows).into_iter().map(ListEntity::User).collect(),
        }
    }
}

impl FromStr for Collection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "classification" | "trees" => Ok(Self::Classification),
            "field" | "field-data" | "field_data" => Ok(Self::Field),
            "locations" => Ok(Self::Locations),
            "users" => Ok(Self::Users),
            other => Err(AppError::validation(format!("Unknown collection: '{other}'"))),
        }
    }
}

/// Fixed sort options offered by every list view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortKey {
    /// Name, A to Z.
    NameAsc,
    /// Name, Z to A.
    NameDesc,
    /// Newest first.
    #[default]
    Recent,
    /// Oldest first.
    Oldest,
}

impl SortKey {
    /// Every key, in menu order.
    pub const ALL: [SortKey; 4] = [Self::NameAsc, Self::NameDesc, Self::Recent, Self::Oldest];

    /// Ordering for `collection`.
    pub fn order(&self, collection: Collection) -> SortField {
        match self {
            Self::NameAsc => SortField::asc(collection.name_column()),
            Self::NameDesc => SortField::desc(collection.name_column()),
            Self::Recent => SortField::desc("created_at"),
            Self::Oldest => SortField::asc("created_at"),
        }
    }

    /// Menu value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NameAsc => "name-asc",
            Self::NameDesc => "name-desc",
            Self::Recent => "recent",
            Self::Oldest => "oldest",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s.trim())
            .ok_or_else(|| AppError::validation(format!("Unknown sort key: '{s}'")))
    }
}

/// Created-within window facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreatedWithin {
    /// Last 24 hours.
    Day,
    /// Last 7 days.
    Week,
    /// Last 30 days.
    Month,
    /// Last 365 days.
    Year,
}

impl CreatedWithin {
    /// Earliest `created_at` inside the window ending at `now`.
    pub fn since(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let days = match self {
            Self::Day => 1,
            Self::Week => 7,
            Self::Month => 30,
            Self::Year => 365,
        };
        now - Duration::days(days)
    }
}

impl FromStr for CreatedWithin {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" | "24h" => Ok(Self::Day),
            "week" | "7d" => Ok(Self::Week),
            "month" | "30d" => Ok(Self::Month),
            "year" | "365d" => Ok(Self::Year),
            other => Err(AppError::validation(format!("Unknown window: '{other}'"))),
        }
    }
}

/// Facet filters. `status` applies to field data only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facets {
    /// Exact status match.
    pub status: Option<String>,
    /// Created within a recent window.
    pub created_within: Option<CreatedWithin>,
}

impl Facets {
    /// Drop facets `collection` does not support.
    pub fn retain_applicable(&mut self, collection: Collection) {
        if !collection.has_status() {
            self.status = None;
        }
    }
}

/// Every input of a list view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListState {
    /// Table being viewed.
    pub collection: Collection,
    /// Search text as typed.
    pub search: String,
    /// Ordering.
    pub sort: SortKey,
    /// Current page (1-based).
    pub page: u64,
    /// Rows per page.
    pub page_size: u64,
    /// Facet filters.
    pub facets: Facets,
}

impl ListState {
    /// First page of `collection` with no search or facets.
    pub fn new(collection: Collection, page_size: u64) -> Self {
        Self {
            collection,
            search: String::new(),
            sort: SortKey::default(),
            page: 1,
            page_size,
            facets: Facets::default(),
        }
    }

    /// Page window requested by this state.
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }

    /// The counted, ranged select for this state.
    pub fn to_query(&self, now: DateTime<Utc>) -> SelectQuery {
        let collection = self.collection;
        let (from, to) = self.page_request().range();
        let mut query = SelectQuery::table(collection.table())
            .columns(collection.columns())
            .order(self.sort.order(collection))
            .range(from, to)
            .with_count();

        let term = self.search.trim();
        if !term.is_empty() {
            query = query.filter(FilterField::contains(collection.search_column(), term));
        }
        if let Some(status) = self.facets.status.as_deref().filter(|_| collection.has_status()) {
            query = query.filter(FilterField::eq("status", status));
        }
        if let Some(window) = self.facets.created_within {
            query = query.filter(FilterField::gte("created_at", window.since(now).to_rfc3339()));
        }
        query
    }
}

/// One row of a list view.
#[derive(Debug, Clone, PartialEq)]
pub enum ListEntity {
    /// A tree of either kind.
    Tree(TreeRecord),
    /// A location.
    Location(Location),
    /// A user profile.
    User(UserProfile),
}

impl ListEntity {
    /// Row id as text.
    pub fn id(&self) -> String {
        match self {
            Self::Tree(t) => t.id().to_string(),
            Self::Location(l) => l.id.to_string(),
            Self::User(u) => u.id.clone(),
        }
    }

    /// Primary display label.
    pub fn label(&self) -> &str {
        match self {
            Self::Tree(t) => &t.profile().common_name,
            Self::Location(l) => &l.name,
            Self::User(u) => &u.display_name,
        }
    }

    /// Creation time.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Tree(t) => t.created_at(),
            Self::Location(l) => l.created_at,
            Self::User(u) => u.created_at,
        }
    }
}
