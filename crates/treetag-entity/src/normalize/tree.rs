//! Tree row normalizers.

use serde_json::Value;
use tracing::debug;

use crate::tree::{ClassificationRecord, Coordinates, Endemic, FieldRecord, Rank, Taxonomy, TreeProfile};

use super::value::{integer, nested, non_empty, number, present, string_list, text, timestamp};

/// Descriptive fields of a classification row.
pub fn profile(row: &Value) -> TreeProfile {
    let taxonomy = nested(row, "taxonomy").unwrap_or(Value::Null);
    let endemic = nested(row, "endemic").unwrap_or(Value::Null);

    let mut ranks = Taxonomy::default();
    for rank in Rank::ALL {
        *ranks.get_mut(rank) = text(&taxonomy, rank.as_str());
    }

    TreeProfile {
        common_name: text(row, "common_name"),
        scientific_name: text(row, "scientific_name"),
        taxonomy: ranks,
        endemic: Endemic {
            region: text(&endemic, "region"),
            countries: string_list(&endemic, "countries"),
            provinces: string_list(&endemic, "provinces"),
        },
        description: text(row, "description"),
        characteristics: string_list(row, "characteristics"),
    }
}

/// A classification (catalog) row.
pub fn classification(row: &Value) -> ClassificationRecord {
    ClassificationRecord {
        id: text(row, "id"),
        profile: profile(row),
        created_at: timestamp(row, "created_at"),
    }
}

/// Every classification row, in order.
pub fn classifications(rows: &[Value]) -> Vec<ClassificationRecord> {
    rows.iter().map(classification).collect()
}

/// A field row with its embedded classification (`trees`) and optional
/// location (`locations`).
///
/// Returns `None` when the classification is missing; such a row cannot
/// be shown as a tree.
pub fn field_record(row: &Value) -> Option<FieldRecord> {
    let template = nested(row, "trees")?;
    let location = nested(row, "locations");

    let label = location
        .as_ref()
        .and_then(|l| non_empty(l, "name"))
        .unwrap_or_else(|| text(row, "location"));
    let location_id = integer(row, "location_id")
        .or_else(|| location.as_ref().and_then(|l| integer(l, "id")));

    let classification_id = match text(row, "tree_id") {
        id if id.is_empty() => text(&template, "id"),
        id => id,
    };

    Some(FieldRecord {
        id: text(row, "id"),
        classification_id,
        profile: profile(&template),
        coordinates: Coordinates {
            latitude: number(row, "latitude"),
            longitude: number(row, "longitude"),
            location: label,
        },
        location_id,
        status: text(row, "status"),
        created_at: timestamp(row, "created_at"),
    })
}

/// Field rows that carry a classification; the rest are dropped.
pub fn field_records(rows: &[Value]) -> Vec<FieldRecord> {
    rows.iter()
        .filter_map(|row| {
            let record = field_record(row);
            if record.is_none() {
                debug!(id = %text(row, "id"), "Dropping field row without classification");
            }
            record
        })
        .collect()
}

/// Copy a template's descriptive fields into a draft.
///
/// Identity and creation time are never touched. Each field falls back to
/// the draft's current value when the template lacks it.
pub fn merge_template(draft: &mut TreeProfile, template: &Value) {
    take_text(&mut draft.common_name, template, "common_name");
    take_text(&mut draft.scientific_name, template, "scientific_name");
    take_text(&mut draft.description, template, "description");

    if let Some(taxonomy) = nested(template, "taxonomy") {
        for rank in Rank::ALL {
            take_text(draft.taxonomy.get_mut(rank), &taxonomy, rank.as_str());
        }
    }

    if let Some(endemic) = nested(template, "endemic") {
        take_text(&mut draft.endemic.region, &endemic, "region");
        take_list(&mut draft.endemic.countries, &endemic, "countries");
        take_list(&mut draft.endemic.provinces, &endemic, "provinces");
    }

    take_list(&mut draft.characteristics, template, "characteristics");
}

fn take_text(slot: &mut String, src: &Value, key: &str) {
    if present(src, key) {
        *slot = text(src, key);
    }
}

fn take_list(slot: &mut Vec<String>, src: &Value, key: &str) {
    if present(src, key) {
        *slot = string_list(src, key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn angsana_row() -> Value {
        json!({
            "id": "b7c1",
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
            "endemic": { "region": "Southeast Asia", "countries": ["Philippines"], "provinces": [] },
            "description": "Large deciduous tree",
            "characteristics": ["Yellow flowers", "Buttressed trunk"],
            "created_at": "2024-03-01T08:00:00Z"
        })
    }

    #[test]
    fn test_full_classification_row() {
        let record = classification(&angsana_row());
        assert_eq!(record.id, "b7c1");
        assert_eq!(record.profile.taxonomy.family, "Fabaceae");
        assert_eq!(record.profile.endemic.countries, vec!["Philippines"]);
        assert_eq!(record.profile.characteristics.len(), 2);
        assert!(record.created_at.is_some());
    }

    #[test]
    fn test_sparse_row_defaults_everything() {
        let record = classification(&json!({ "id": 7, "taxonomy": null, "endemic": "garbage" }));
        assert_eq!(record.id, "7");
        assert_eq!(record.profile.common_name, "");
        assert_eq!(record.profile.taxonomy, Taxonomy::default());
        assert_eq!(record.profile.endemic, Endemic::default());
        assert!(record.profile.characteristics.is_empty());
        assert!(record.created_at.is_none());
    }

    #[test]
    fn test_field_row_with_array_wrapped_relations() {
        let row = json!({
            "id": 42,
            "tree_id": "b7c1",
            "latitude": "14.65",
            "longitude": 121.07,
            "location_id": 3,
            "status": "active",
            "trees": [angsana_row()],
            "locations": [{ "id": 3, "name": "Sunken Garden" }],
            "created_at": "2024-05-01T00:00:00Z"
        });
        let record = field_record(&row).expect("has classification");
        assert_eq!(record.id, "42");
        assert_eq!(record.classification_id, "b7c1");
        assert_eq!(record.profile.common_name, "Angsana");
        assert_eq!(record.coordinates.latitude, 14.65);
        assert_eq!(record.coordinates.location, "Sunken Garden");
        assert_eq!(record.location_id, Some(3));
    }

    #[test]
    fn test_field_rows_without_classification_are_dropped() {
        let rows = vec![
            json!({ "id": 1, "trees": null }),
            json!({ "id": 2, "trees": [] }),
            json!({ "id": 3, "trees": { "common_name": "Narra" }, "location": "Quad" }),
        ];
        let records = field_records(&rows);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "3");
        assert_eq!(records[0].coordinates.location, "Quad");
    }

    #[test]
    fn test_merge_keeps_draft_values_for_absent_fields() {
        let mut draft = TreeProfile {
            common_name: "Angsana".to_string(),
            description: "typed by hand".to_string(),
            characteristics: vec!["keep me".to_string()],
            ..Default::default()
        };
        draft.taxonomy.kingdom = "Plantae".to_string();

        let template = json!({
            "id": "must-not-copy",
            "created_at": "2020-01-01T00:00:00Z",
            "scientific_name": "Pterocarpus indicus",
            "taxonomy": { "genus": "Pterocarpus" },
            "endemic": { "countries": ["Philippines", "Indonesia"] },
            "description": null
        });
        merge_template(&mut draft, &template);

        assert_eq!(draft.common_name, "Angsana");
        assert_eq!(draft.scientific_name, "Pterocarpus indicus");
        assert_eq!(draft.description, "typed by hand");
        assert_eq!(draft.taxonomy.kingdom, "Plantae");
        assert_eq!(draft.taxonomy.genus, "Pterocarpus");
        assert_eq!(draft.endemic.countries, vec!["Philippines", "Indonesia"]);
        assert_eq!(draft.characteristics, vec!["keep me"]);
    }
}
