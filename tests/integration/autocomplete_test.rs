//! Integration tests for name suggestions and template hydration.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use treetag_core::types::filter::{FilterOp, FilterValue};
use treetag_entity::tables;
use treetag_entity::tree::{Rank, TreeRecord};
use treetag_service::autocomplete::{Hydration, SuggestPhase};
use treetag_service::{Autocomplete, TemplateHydrator, TreeForm, TreeNameSource, TreeService};

fn name_field(gateway: &Arc<treetag_gateway::MemoryGateway>) -> Autocomplete {
    let config = helpers::query_config();
    Autocomplete::new(Arc::new(TreeNameSource::new(gateway.clone(), &config)), &config)
}

#[tokio::test(start_paused = true)]
async fn test_typing_an_sends_one_limited_search() {
    let gateway = helpers::gateway();
    helpers::seed_catalog(&gateway);
    let field = name_field(&gateway);

    field.focus().await;
    gateway.clear_requests();
    field.input("A").await;
    field.input("An").await;
    tokio::time::sleep(Duration::from_millis(400)).await;

    let selects = gateway.selects(tables::TREES);
    assert_eq!(selects.len(), 1);
    let search = &selects[0];
    assert_eq!(search.limit, Some(3));
    assert_eq!(search.filters.len(), 1);
    assert_eq!(search.filters[0].field, "common_name");
    assert_eq!(search.filters[0].op, FilterOp::ILike);
    assert_eq!(search.filters[0].value, FilterValue::String("%An%".into()));

    assert_eq!(
        field.snapshot().phase,
        SuggestPhase::Results(vec!["Angsana".into(), "Anahaw".into()])
    );
}

#[tokio::test(start_paused = true)]
async fn test_short_input_shows_recent_names_once() {
    let gateway = helpers::gateway();
    helpers::seed_catalog(&gateway);
    let field = name_field(&gateway);

    field.focus().await;
    field.input("M").await;
    field.blur();
    tokio::time::sleep(Duration::from_millis(200)).await;
    field.focus().await;

    let selects = gateway.selects(tables::TREES);
    assert_eq!(selects.len(), 1);
    assert!(selects[0].filters.is_empty());
    assert_eq!(selects[0].limit, Some(5));
    assert_eq!(
        field.snapshot().phase,
        SuggestPhase::Results(vec![
            "Molave".into(),
            "Narra".into(),
            "Angsana".into(),
            "Banaba".into(),
            "Anahaw".into(),
        ])
    );
}

#[tokio::test(start_paused = true)]
async fn test_selecting_hydrates_without_searching_again() {
    let gateway = helpers::gateway();
    helpers::seed_catalog(&gateway);
    let field = name_field(&gateway);
    let hydrator = TemplateHydrator::new(TreeService::new(gateway.clone()));
    let form = TreeForm::new_field_record();

    field.focus().await;
    field.input("Ang").await;
    assert_eq!(field.settled().await, SuggestPhase::Results(vec!["Angsana".into()]));
    gateway.clear_requests();

    let outcome = hydrator.select(&field, &form, "Angsana").await;
    field.input("Angsana").await;
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(outcome, Hydration::Merged);
    let selects = gateway.selects(tables::TREES);
    assert_eq!(selects.len(), 1, "only the template fetch");
    assert_eq!(selects[0].filters[0].op, FilterOp::Eq);

    let draft = form.draft();
    assert_eq!(draft.profile().scientific_name, "Pterocarpus indicus");
    assert_eq!(draft.profile().taxonomy.get(Rank::Family), "Fabaceae");
    let TreeRecord::Field(record) = &draft else {
        panic!("field draft expected");
    };
    assert_eq!(record.classification_id, "c-angsana");
    assert!(record.created_at.is_none());
    assert!(!field.snapshot().open);
}

#[tokio::test]
async fn test_failed_template_fetch_keeps_the_draft() {
    let gateway = helpers::gateway();
    helpers::seed_catalog(&gateway);
    let hydrator = TemplateHydrator::new(TreeService::new(gateway.clone()));
    let form = TreeForm::new_classification();
    form.set_description("Planted by the river");
    gateway.fail_table(tables::TREES, "connection reset");

    let outcome = hydrator.apply(&form, "Narra").await;

    assert_eq!(outcome, Hydration::Failed("connection reset".into()));
    let draft = form.draft();
    assert_eq!(draft.profile().common_name, "Narra");
    assert_eq!(draft.profile().description, "Planted by the river");
    assert!(form.notice().is_some());
}

#[tokio::test]
async fn test_unknown_name_sets_only_the_name() {
    let gateway = helpers::gateway();
    helpers::seed_catalog(&gateway);
    let hydrator = TemplateHydrator::new(TreeService::new(gateway.clone()));
    let form = TreeForm::new_classification();

    assert_eq!(hydrator.apply(&form, "Kamagong").await, Hydration::NoTemplate);
    assert_eq!(form.draft().profile().common_name, "Kamagong");
    assert!(form.draft().profile().scientific_name.is_empty());
}
