//! Integration tests for the tree form controller.

mod helpers;

use std::time::Duration;

use assert_matches::assert_matches;
use async_trait::async_trait;
use serde_json::json;
use tokio::sync::oneshot;

use treetag_core::error::ErrorKind;
use treetag_core::traits::position::{GeoError, Position, PositionSource};
use treetag_entity::normalize;
use treetag_entity::tables;
use treetag_entity::tree::{Rank, TreeRecord};
use treetag_gateway::GatewayRequest;
use treetag_service::{TreeForm, TreeService};

struct DeniedPosition;

#[async_trait]
impl PositionSource for DeniedPosition {
    async fn current_position(&self, _timeout: Duration) -> Result<Position, GeoError> {
        Err(GeoError::PermissionDenied)
    }
}

struct FixedPosition(f64, f64);

#[async_trait]
impl PositionSource for FixedPosition {
    async fn current_position(&self, _timeout: Duration) -> Result<Position, GeoError> {
        Ok(Position {
            latitude: self.0,
            longitude: self.1,
            accuracy_m: Some(5.0),
        })
    }
}

#[tokio::test]
async fn test_new_classification_insert_carries_every_field() {
    let gateway = helpers::gateway();
    let trees = TreeService::new(gateway.clone());
    let form = TreeForm::new_classification();

    form.set_common_name("Angsana");
    form.set_scientific_name("Pterocarpus indicus");
    form.set_rank(Rank::Genus, "Pterocarpus");
    form.set_countries("Philippines, Indonesia");
    form.stage_characteristic("Yellow flowers");
    form.characteristic_key("Enter");
    form.stage_characteristic("Buttressed trunk");
    form.commit_characteristic();

    let saved = form
        .submit(|draft| async move { trees.save(&draft).await })
        .await
        .expect("saved");
    assert!(saved.created_at().is_some());

    let requests = gateway.requests();
    assert_eq!(requests.len(), 1);
    let GatewayRequest::Insert { table, row } = &requests[0] else {
        panic!("expected an insert, got {:?}", requests[0]);
    };
    assert_eq!(table, tables::TREES);
    assert!(row.get("id").is_none());
    assert!(row.get("created_at").is_none());

    let taxonomy = row["taxonomy"].as_object().expect("taxonomy");
    assert_eq!(taxonomy.len(), 7);
    assert_eq!(taxonomy["genus"], json!("Pterocarpus"));
    assert_eq!(taxonomy["kingdom"], json!(""));
    assert_eq!(row["characteristics"], json!(["Yellow flowers", "Buttressed trunk"]));
    assert_eq!(row["endemic"]["countries"], json!(["Philippines", "Indonesia"]));
    assert!(!form.is_submitting());
}

#[tokio::test]
async fn test_editing_never_touches_the_source_record() {
    let record = TreeRecord::Classification(normalize::classification(&helpers::angsana()));
    let form = TreeForm::edit(&record);

    form.set_common_name("Narra");
    form.stage_characteristic("Hard wood");
    form.commit_characteristic();
    form.remove_characteristic(0);
    form.set_countries("Malaysia");

    assert_eq!(record.profile().common_name, "Angsana");
    assert_eq!(
        record.profile().characteristics,
        vec!["Yellow flowers".to_string(), "Buttressed trunk".to_string()]
    );
    assert_eq!(record.profile().endemic.countries, vec!["Philippines", "Indonesia"]);

    let draft = form.draft();
    assert_eq!(draft.id(), record.id());
    assert_eq!(draft.created_at(), record.created_at());
    assert_eq!(
        draft.profile().characteristics,
        vec!["Buttressed trunk".to_string(), "Hard wood".to_string()]
    );
}

#[tokio::test]
async fn test_list_text_is_split_trimmed_and_compacted() {
    let form = TreeForm::new_classification();
    form.set_countries(" Philippines, Indonesia ,, Malaysia ,");
    form.set_provinces("");

    let draft = form.draft();
    assert_eq!(
        draft.profile().endemic.countries,
        vec!["Philippines", "Indonesia", "Malaysia"]
    );
    assert!(draft.profile().endemic.provinces.is_empty());
    assert_eq!(form.countries_text(), "Philippines, Indonesia, Malaysia");
}

#[tokio::test]
async fn test_unparseable_coordinate_is_zero() {
    let form = TreeForm::new_field_record();
    assert!(form.set_latitude("abc"));
    assert!(form.set_longitude("121.05"));

    let draft = form.draft();
    let coordinates = draft.coordinates().expect("field record");
    assert_eq!(coordinates.latitude, 0.0);
    assert_eq!(coordinates.longitude, 121.05);

    let classification = TreeForm::new_classification();
    assert!(!classification.set_latitude("14.6"));
}

#[tokio::test]
async fn test_denied_geolocation_leaves_coordinates() {
    let form = TreeForm::new_field_record();
    form.set_latitude("14.6");
    form.set_longitude("121.0");

    let result = form
        .apply_position(&DeniedPosition, Duration::from_secs(10))
        .await;

    assert_eq!(result, Err(GeoError::PermissionDenied));
    assert_eq!(form.notice().as_deref(), Some(GeoError::PermissionDenied.user_message()));
    let draft = form.draft();
    let coordinates = draft.coordinates().expect("field record");
    assert_eq!((coordinates.latitude, coordinates.longitude), (14.6, 121.0));

    form.apply_position(&FixedPosition(10.5, 122.25), Duration::from_secs(10))
        .await
        .expect("fix");
    let draft = form.draft();
    let coordinates = draft.coordinates().expect("field record");
    assert_eq!((coordinates.latitude, coordinates.longitude), (10.5, 122.25));
    assert!(form.notice().is_none());
}

#[tokio::test]
async fn test_field_record_needs_a_classification() {
    let gateway = helpers::gateway();
    let trees = TreeService::new(gateway.clone());
    let form = TreeForm::new_field_record();
    form.set_common_name("Angsana");
    assert!(!form.can_submit());

    let err = form
        .submit(|draft| async move { trees.save(&draft).await })
        .await
        .expect_err("not linked");
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(gateway.requests().is_empty());

    form.merge_template(&helpers::angsana());
    assert!(form.can_submit());
    assert_matches!(form.draft(), TreeRecord::Field(r) if r.classification_id == "c-angsana");
}

#[tokio::test]
async fn test_fields_are_locked_while_submitting() {
    let form = TreeForm::new_classification();
    form.set_common_name("Molave");
    let (release, released) = oneshot::channel::<()>();

    let first = form.submit(|draft| async move {
        let _ = released.await;
        Ok(draft)
    });
    let probe = async {
        tokio::task::yield_now().await;
        assert!(form.is_submitting());
        assert!(!form.set_common_name("Narra"));
        assert!(!form.stage_characteristic("Hard wood"));
        let second = form.submit(|draft| async move { Ok(draft) }).await;
        let _ = release.send(());
        second
    };

    let (first, second) = tokio::join!(first, probe);
    assert_eq!(first.expect("first submit").profile().common_name, "Molave");
    assert_matches!(second, Err(e) if e.kind == ErrorKind::Conflict);
    assert!(!form.is_submitting());
    assert!(form.set_common_name("Narra"));
}
