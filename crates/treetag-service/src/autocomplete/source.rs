//! Where suggestions come from.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use treetag_core::config::query::QueryConfig;
use treetag_core::result::AppResult;
use treetag_core::traits::gateway::Gateway;
use treetag_core::types::filter::FilterField;
use treetag_core::types::query::SelectQuery;
use treetag_core::types::sorting::SortField;
use treetag_entity::tables;

/// Candidate values for one lookup field.
#[async_trait]
pub trait SuggestionSource: Send + Sync + 'static {
    /// Most recently created values, shown before the user types.
    async fn recent(&self) -> AppResult<Vec<String>>;

    /// Case-insensitive substring matches for `term`.
    async fn search(&self, term: &str) -> AppResult<Vec<String>>;
}

/// Distinct, non-blank string values of `column`, in row order.
fn column_values(rows: &[Value], column: &str) -> Vec<String> {
    let mut values: Vec<String> = Vec::with_capacity(rows.len());
    for value in rows
        .iter()
        .filter_map(|row| row.get(column).and_then(Value::as_str))
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        if !values.iter().any(|v| v == value) {
            values.push(value.to_string());
        }
    }
    values
}

/// One text column of one table.
struct ColumnLookup {
    gateway: Arc<dyn Gateway>,
    table: &'static str,
    column: &'static str,
    limit: u64,
    recent_limit: u64,
}

impl ColumnLookup {
    async fn recent(&self) -> AppResult<Vec<String>> {
        let query = SelectQuery::table(self.table)
            .columns(self.column)
            .order(SortField::desc("created_at"))
            .limit(self.recent_limit);
        let page = self.gateway.select(&query).await?;
        Ok(column_values(&page.rows, self.column))
    }

    async fn search(&self, term: &str) -> AppResult<Vec<String>> {
        let query = SelectQuery::table(self.table)
            .columns(self.column)
            .filter(FilterField::contains(self.column, term))
            .limit(self.limit);
        let page = self.gateway.select(&query).await?;
        Ok(column_values(&page.rows, self.column))
    }
}

/// Tree common names from the classification table.
///
/// A candidate exactly equal to the typed text is left out.
pub struct TreeNameSource {
    lookup: ColumnLookup,
}

impl TreeNameSource {
    /// Source capped at the configured tree suggestion limit.
    pub fn new(gateway: Arc<dyn Gateway>, config: &QueryConfig) -> Self {
        Self {
            lookup: ColumnLookup {
                gateway,
                table: tables::TREES,
                column: "common_name",
                limit: config.tree_suggestion_limit,
                recent_limit: config.recent_limit,
            },
        }
    }
}

#[async_trait]
impl SuggestionSource for TreeNameSource {
    async fn recent(&self) -> AppResult<Vec<String>> {
        self.lookup.recent().await
    }

    async fn search(&self, term: &str) -> AppResult<Vec<String>> {
        let mut names = self.lookup.search(term).await?;
        names.retain(|name| name != term);
        Ok(names)
    }
}

/// Location names.
pub struct LocationSource {
    lookup: ColumnLookup,
}

impl LocationSource {
    /// Source capped at the configured location suggestion limit.
    pub fn new(gateway: Arc<dyn Gateway>, config: &QueryConfig) -> Self {
        Self {
            lookup: ColumnLookup {
                gateway,
                table: tables::LOCATIONS,
                column: "name",
                limit: config.location_suggestion_limit,
                recent_limit: config.recent_limit,
            },
        }
    }
}

#[async_trait]
impl SuggestionSource for LocationSource {
    async fn recent(&self) -> AppResult<Vec<String>> {
        self.lookup.recent().await
    }

    async fn search(&self, term: &str) -> AppResult<Vec<String>> {
        self.lookup.search(term).await
    }
}
