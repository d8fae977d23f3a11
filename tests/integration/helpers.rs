//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{Value, json};

use treetag_core::config::query::QueryConfig;
use treetag_entity::tables;
use treetag_gateway::MemoryGateway;

/// Query tuning used by every test (300 ms debounce, 20 rows per page).
pub fn query_config() -> QueryConfig {
    QueryConfig::default()
}

/// Empty in-memory gateway.
pub fn gateway() -> Arc<MemoryGateway> {
    Arc::new(MemoryGateway::new())
}

/// A full catalog row for Angsana.
pub fn angsana() -> Value {
    json!({
        "id": "c-angsana",
        "common_name": "Angsana",
        "scientific_name": "Pterocarpus indicus",
        "taxonomy": {
            "kingdom": "Plantae",
            "phylum": "Tracheophyta",
            "class": "Magnoliopsida",
            "order": "Fabales",
            "family": "Fabaceae",
            "genus": "Pterocarpus",
            "species": "P. indicus"
        },
        "endemic": {
            "region": "Southeast Asia",
            "countries": ["Philippines", "Indonesia"],
            "provinces": ["Laguna"]
        },
        "description": "Large deciduous tree with fragrant yellow flowers.",
        "characteristics": ["Yellow flowers", "Buttressed trunk"],
        "created_at": "2024-03-01T08:00:00Z"
    })
}

/// Seed a small catalog: Angsana plus a few other names.
pub fn seed_catalog(gateway: &MemoryGateway) {
    gateway.seed(
        tables::TREES,
        vec![
            json!({ "id": "c-an", "common_name": "An", "created_at": "2024-01-01T00:00:00Z" }),
            angsana(),
            json!({ "id": "c-anahaw", "common_name": "Anahaw", "created_at": "2024-02-01T00:00:00Z" }),
            json!({ "id": "c-banaba", "common_name": "Banaba", "created_at": "2024-02-15T00:00:00Z" }),
            json!({ "id": "c-narra", "common_name": "Narra", "created_at": "2024-04-01T00:00:00Z" }),
            json!({ "id": "c-molave", "common_name": "Molave", "created_at": "2024-05-01T00:00:00Z" }),
        ],
    );
}

/// Seed `count` catalog rows named `Tree 00`, `Tree 01`, ...
pub fn seed_numbered_trees(gateway: &MemoryGateway, count: usize) {
    gateway.seed(
        tables::TREES,
        (0..count).map(|i| {
            json!({
                "id": format!("t-{i:02}"),
                "common_name": format!("Tree {i:02}"),
                "created_at": format!("2024-01-{:02}T00:00:00Z", i % 28 + 1),
            })
        }),
    );
}

/// Seed `count` placements of Angsana at one location.
pub fn seed_field_data(gateway: &MemoryGateway, count: usize) {
    gateway.seed(tables::TREES, vec![angsana()]);
    gateway.seed(
        tables::LOCATIONS,
        vec![json!({ "id": 1, "name": "North Park", "created_at": "2024-01-01T00:00:00Z" })],
    );
    gateway.seed(
        tables::FIELD_DATA,
        (0..count).map(|i| {
            json!({
                "id": format!("f-{i:02}"),
                "tree_id": "c-angsana",
                "location_id": 1,
                "location": "North Park",
                "latitude": 14.6 + i as f64 * 0.001,
                "longitude": 121.0,
                "status": if i % 2 == 0 { "active" } else { "removed" },
                "created_at": format!("2024-06-01T00:{:02}:00Z", i % 60),
            })
        }),
    );
}
