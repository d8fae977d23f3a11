//! Integration tests for the dashboard list controller.

mod helpers;

use std::time::Duration;

use assert_matches::assert_matches;

use treetag_core::types::filter::{FilterOp, FilterValue};
use treetag_entity::tables;
use treetag_entity::tree::TreeRecord;
use treetag_gateway::GatewayRequest;
use treetag_service::list::{Collection, CreatedWithin, ListController, ListEntity, SortKey};

#[tokio::test]
async fn test_field_data_page_two_of_forty_five() {
    let gateway = helpers::gateway();
    helpers::seed_field_data(&gateway, 45);
    let list = ListController::new(gateway.clone(), &helpers::query_config(), Collection::Field);

    let snapshot = list.set_page(2).await;

    let selects = gateway.selects(tables::FIELD_DATA);
    assert_eq!(selects.len(), 1);
    assert_eq!(selects[0].range, Some((20, 39)));
    assert!(selects[0].count_exact);
    assert_eq!(selects[0].columns, tables::FIELD_DATA_COLUMNS);

    assert_eq!(snapshot.page.items.len(), 20);
    assert_eq!(snapshot.page.summary(), "21 - 40 of 45");
    assert_eq!(snapshot.page.total_pages, 3);
    assert_matches!(
        &snapshot.page.items[0],
        ListEntity::Tree(TreeRecord::Field(record))
            if record.profile.common_name == "Angsana"
                && record.coordinates.location == "North Park"
    );
}

#[tokio::test]
async fn test_status_and_window_facets_build_filters() {
    let gateway = helpers::gateway();
    helpers::seed_field_data(&gateway, 10);
    let list = ListController::new(gateway.clone(), &helpers::query_config(), Collection::Field);

    list.set_page(2).await;
    let snapshot = list
        .set_status(Some("active".into()))
        .await
        .expect("status applies to field data");
    assert_eq!(snapshot.state.page, 1);
    assert_eq!(snapshot.page.total_items, 5);

    list.set_created_within(Some(CreatedWithin::Week)).await;
    let last = gateway
        .selects(tables::FIELD_DATA)
        .pop()
        .expect("a select was sent");
    assert!(last.filters.iter().any(|f| f.field == "status"
        && f.op == FilterOp::Eq
        && f.value == FilterValue::String("active".into())));
    assert!(last.filters.iter().any(|f| f.field == "created_at" && f.op == FilterOp::Gte));
}

#[tokio::test(start_paused = true)]
async fn test_stale_response_is_discarded() {
    let gateway = helpers::gateway();
    helpers::seed_numbered_trees(&gateway, 5);
    let list = ListController::new(
        gateway.clone(),
        &helpers::query_config(),
        Collection::Classification,
    );

    gateway.push_delay(Duration::from_millis(500));
    let slow = {
        let list = list.clone();
        tokio::spawn(async move { list.set_sort(SortKey::NameAsc).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    let fast = list.set_sort(SortKey::NameDesc).await;
    assert_eq!(fast.page.items[0].label(), "Tree 04");

    slow.await.expect("task joined");
    let current = list.snapshot();
    assert_eq!(current.state.sort, SortKey::NameDesc);
    assert_eq!(current.page.items[0].label(), "Tree 04");
    assert_eq!(gateway.selects(tables::TREES).len(), 2);
}

#[tokio::test]
async fn test_declined_delete_sends_nothing() {
    let gateway = helpers::gateway();
    helpers::seed_numbered_trees(&gateway, 3);
    let list = ListController::new(
        gateway.clone(),
        &helpers::query_config(),
        Collection::Classification,
    );
    list.refresh().await;
    gateway.clear_requests();

    let decline = |_: &str| false;
    let deleted = list.delete("t-01", &decline).await.expect("no error");

    assert!(!deleted);
    assert!(gateway.requests().is_empty());
    assert_eq!(list.snapshot().page.total_items, 3);
}

#[tokio::test]
async fn test_confirmed_delete_refetches() {
    let gateway = helpers::gateway();
    helpers::seed_numbered_trees(&gateway, 3);
    let list = ListController::new(
        gateway.clone(),
        &helpers::query_config(),
        Collection::Classification,
    );
    list.refresh().await;
    gateway.clear_requests();

    let accept = |_: &str| true;
    assert!(list.delete("t-01", &accept).await.expect("deleted"));

    let requests = gateway.requests();
    assert_eq!(requests.len(), 2);
    assert_matches!(&requests[0], GatewayRequest::Delete { table, id } if table == tables::TREES && id == "t-01");
    assert_matches!(&requests[1], GatewayRequest::Select(_));
    assert_eq!(list.snapshot().page.total_items, 2);
}

#[tokio::test]
async fn test_failed_delete_names_the_operation() {
    let gateway = helpers::gateway();
    helpers::seed_numbered_trees(&gateway, 3);
    gateway.fail_table(tables::TREES, "permission denied for table trees");
    let list = ListController::new(
        gateway.clone(),
        &helpers::query_config(),
        Collection::Classification,
    );

    let accept = |_: &str| true;
    let err = list.delete("t-01", &accept).await.expect_err("gateway refused");
    assert_eq!(err.message, "Failed to delete tree: permission denied for table trees");
}

#[tokio::test(start_paused = true)]
async fn test_search_resets_page_and_fetches_after_settling() {
    let gateway = helpers::gateway();
    helpers::seed_numbered_trees(&gateway, 45);
    let list = ListController::new(
        gateway.clone(),
        &helpers::query_config(),
        Collection::Classification,
    );
    list.set_page(3).await;
    gateway.clear_requests();

    list.set_search("tree 4");
    assert_eq!(list.state().page, 1);
    assert!(gateway.requests().is_empty());

    tokio::time::sleep(Duration::from_millis(350)).await;
    let selects = gateway.selects(tables::TREES);
    assert_eq!(selects.len(), 1);
    assert_eq!(selects[0].filters[0].value, FilterValue::String("%tree 4%".into()));
    assert_eq!(list.snapshot().page.total_items, 6);
}
