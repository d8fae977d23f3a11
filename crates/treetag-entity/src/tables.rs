//! Gateway table and relation names.

/// Classification (catalog) records.
pub const TREES: &str = "trees";
/// Field placements; each row points at a `trees` row and a `locations` row.
pub const FIELD_DATA: &str = "tree_field_data";
/// Named physical locations.
pub const LOCATIONS: &str = "locations";
/// User profiles keyed by auth identity.
pub const PROFILES: &str = "profiles";

/// Projection for field rows with their classification and location embedded.
pub const FIELD_DATA_COLUMNS: &str = "*, trees!inner(*), locations(id, name)";
