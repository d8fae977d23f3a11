//! Ordering field records by distance from a point.

use serde::Serialize;

use treetag_core::traits::position::Position;
use treetag_entity::tree::FieldRecord;

/// A field record and its distance from the origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Nearby {
    /// The record.
    pub record: FieldRecord,
    /// Great-circle distance in kilometres.
    pub distance_km: f64,
}

/// Sort `records` by haversine distance from `origin`, nearest first.
pub fn nearest_first(records: Vec<FieldRecord>, origin: Position) -> Vec<Nearby> {
    let mut nearby: Vec<Nearby> = records
        .into_iter()
        .map(|record| Nearby {
            distance_km: record
                .coordinates
                .distance_km(origin.latitude, origin.longitude),
            record,
        })
        .collect();
    nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    nearby
}
