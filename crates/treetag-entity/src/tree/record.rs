//! The two tree record variants and their tagged union.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use super::coordinates::Coordinates;
use super::profile::TreeProfile;

/// Status given to new field placements.
pub const DEFAULT_FIELD_STATUS: &str = "active";

/// A catalog entry describing a kind of tree. Has no physical position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    /// Row id in the classification table.
    pub id: String,
    /// Descriptive fields.
    pub profile: TreeProfile,
    /// Server-assigned creation time; `None` for unsaved drafts.
    pub created_at: Option<DateTime<Utc>>,
}

impl ClassificationRecord {
    /// Empty draft with a fresh random id.
    pub fn draft() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            profile: TreeProfile::default(),
            created_at: None,
        }
    }

    /// Row written on insert or full update. Identity and creation time
    /// are server-owned and never written.
    pub fn to_row(&self) -> Value {
        self.profile.to_row()
    }
}

/// A physical tree: a placement row joined with its classification.
///
/// `id` is the placement row's id and is unrelated to
/// `classification_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRecord {
    /// Row id in the field-data table (what QR tags encode).
    pub id: String,
    /// Id of the joined classification row; empty when not yet linked.
    pub classification_id: String,
    /// Descriptive fields copied from the classification.
    pub profile: TreeProfile,
    /// Position and location label.
    pub coordinates: Coordinates,
    /// Linked location row, if any.
    pub location_id: Option<i64>,
    /// Free-form status (e.g. `active`, `removed`).
    pub status: String,
    /// Server-assigned creation time of the placement.
    pub created_at: Option<DateTime<Utc>>,
}

impl FieldRecord {
    /// Empty draft with a fresh random id.
    pub fn draft() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            classification_id: String::new(),
            profile: TreeProfile::default(),
            coordinates: Coordinates::default(),
            location_id: None,
            status: DEFAULT_FIELD_STATUS.to_string(),
            created_at: None,
        }
    }

    /// Placement row written on insert or full update.
    pub fn to_row(&self) -> Value {
        json!({
            "tree_id": self.classification_id,
            "location_id": self.location_id,
            "location": self.coordinates.location,
            "latitude": self.coordinates.latitude,
            "longitude": self.coordinates.longitude,
            "status": self.status,
        })
    }
}

/// Which backing table a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Catalog entry.
    Classification,
    /// Physical placement.
    Field,
}

/// A tree in either context, with an explicit discriminant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeRecord {
    /// Catalog entry.
    Classification(ClassificationRecord),
    /// Physical placement.
    Field(FieldRecord),
}

impl TreeRecord {
    /// The variant discriminant.
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Classification(_) => RecordKind::Classification,
            Self::Field(_) => RecordKind::Field,
        }
    }

    /// Row id in the record's own table.
    pub fn id(&self) -> &str {
        match self {
            Self::Classification(r) => &r.id,
            Self::Field(r) => &r.id,
        }
    }

    /// Descriptive fields.
    pub fn profile(&self) -> &TreeProfile {
        match self {
            Self::Classification(r) => &r.profile,
            Self::Field(r) => &r.profile,
        }
    }

    /// Mutable descriptive fields.
    pub fn profile_mut(&mut self) -> &mut TreeProfile {
        match self {
            Self::Classification(r) => &mut r.profile,
            Self::Field(r) => &mut r.profile,
        }
    }

    /// Server-assigned creation time.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Classification(r) => r.created_at,
            Self::Field(r) => r.created_at,
        }
    }

    /// Position, for field records only.
    pub fn coordinates(&self) -> Option<&Coordinates> {
        match self {
            Self::Classification(_) => None,
            Self::Field(r) => Some(&r.coordinates),
        }
    }

    /// Row written on insert or full update of the record's own table.
    pub fn to_row(&self) -> Value {
        match self {
            Self::Classification(r) => r.to_row(),
            Self::Field(r) => r.to_row(),
        }
    }
}
