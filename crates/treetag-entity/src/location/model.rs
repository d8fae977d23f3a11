//! Location entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// A named physical location trees are placed at.
///
/// Names are unique by convention only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Numeric row id (`0` for unsaved drafts).
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Server-assigned creation time.
    pub created_at: Option<DateTime<Utc>>,
}

impl Location {
    /// Row written on insert or full update.
    pub fn to_row(&self) -> Value {
        json!({ "name": self.name })
    }
}
