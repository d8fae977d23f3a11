//! Table-scoped select queries and their results.

use serde::{Deserialize, Serialize};

use super::filter::FilterField;
use super::sorting::SortField;

/// A read against one gateway table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectQuery {
    /// Table name.
    pub table: String,
    /// Column projection; embedded relations are written `relation(cols)`.
    pub columns: String,
    /// Conjunction of filter predicates.
    pub filters: Vec<FilterField>,
    /// Optional ordering.
    pub order: Option<SortField>,
    /// Optional inclusive row range `(from, to)`.
    pub range: Option<(u64, u64)>,
    /// Optional row limit (ignored when a range is set).
    pub limit: Option<u64>,
    /// Whether to request an exact total count alongside the rows.
    pub count_exact: bool,
}

impl SelectQuery {
    /// Select every column of `table`.
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: "*".to_string(),
            filters: Vec::new(),
            order: None,
            range: None,
            limit: None,
            count_exact: false,
        }
    }

    /// Set the column projection.
    pub fn columns(mut self, columns: impl Into<String>) -> Self {
        self.columns = columns.into();
        self
    }

    /// Add a filter predicate.
    pub fn filter(mut self, filter: FilterField) -> Self {
        self.filters.push(filter);
        self
    }

    /// Set the ordering.
    pub fn order(mut self, order: SortField) -> Self {
        self.order = Some(order);
        self
    }

    /// Restrict to the inclusive row range `[from, to]`.
    pub fn range(mut self, from: u64, to: u64) -> Self {
        self.range = Some((from, to));
        self
    }

    /// Cap the number of returned rows.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Request an exact total count.
    pub fn with_count(mut self) -> Self {
        self.count_exact = true;
        self
    }
}

/// Rows returned by a select, plus the exact count when one was requested.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryPage {
    /// Raw rows as returned by the gateway.
    pub rows: Vec<serde_json::Value>,
    /// Total matching rows, if `count_exact` was set.
    pub total: Option<u64>,
}
