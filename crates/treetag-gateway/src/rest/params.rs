//! Encoding of select queries into REST query pairs and headers.

use treetag_core::types::filter::{FilterField, FilterOp};
use treetag_core::types::query::SelectQuery;

/// Query-string pairs for a select: projection, one pair per filter,
/// ordering, and a `limit` when no range is given.
pub fn query_pairs(query: &SelectQuery) -> Vec<(String, String)> {
    let mut pairs = vec![("select".to_string(), query.columns.clone())];

    pairs.extend(query.filters.iter().map(filter_pair));

    if let Some(order) = &query.order {
        pairs.push(("order".to_string(), order.as_rest()));
    }

    if query.range.is_none() {
        if let Some(limit) = query.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
    }

    pairs
}

/// One filter as `(column, "op.value")`.
pub fn filter_pair(filter: &FilterField) -> (String, String) {
    let value = match filter.op {
        FilterOp::IsNull => "null".to_string(),
        _ => filter.value.as_param(),
    };
    (filter.field.clone(), format!("{}.{}", filter.op.as_rest(), value))
}

/// `Range` header value for an inclusive row range.
pub fn range_header(from: u64, to: u64) -> String {
    format!("{from}-{to}")
}

/// Total row count from a `Content-Range` header (`0-19/45`, `*/0`).
///
/// Returns `None` when the total is unknown (`0-19/*`) or the header is
/// malformed.
pub fn parse_content_range(header: &str) -> Option<u64> {
    let (_, total) = header.trim().rsplit_once('/')?;
    total.parse().ok()
}
