//! Location row normalizers.

use serde_json::Value;

use crate::location::Location;

use super::value::{integer, text, timestamp};

/// A location row.
pub fn location(row: &Value) -> Location {
    Location {
        id: integer(row, "id").unwrap_or(0),
        name: text(row, "name"),
        created_at: timestamp(row, "created_at"),
    }
}

/// Every location row, in order.
pub fn locations(rows: &[Value]) -> Vec<Location> {
    rows.iter().map(location).collect()
}
