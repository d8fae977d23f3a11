//! Integration tests for the session store, local state, and scan progress.

mod helpers;

use std::sync::Arc;

use assert_matches::assert_matches;
use serde_json::json;

use treetag_core::error::ErrorKind;
use treetag_core::traits::local_store::LocalStore;
use treetag_entity::tables;
use treetag_gateway::MemoryAuth;
use treetag_local::FileStore;
use treetag_local::keys::{AUTH_TOKEN, SCAN_COUNT};
use treetag_service::{QrPayload, ScanTracker, SessionStore, TreeService};

#[tokio::test]
async fn test_sign_out_clears_local_state() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("state.json");

    let auth = Arc::new(MemoryAuth::new());
    let user = auth.register("ana@example.org", "secret", json!({ "full_name": "Ana Cruz" }));
    let gateway = helpers::gateway();
    gateway.seed(
        tables::PROFILES,
        vec![json!({ "id": user.id, "full_name": "Ana Cruz", "role": "admin" })],
    );
    let local: Arc<dyn LocalStore> = Arc::new(FileStore::open(&path).await.expect("open"));

    let session = SessionStore::new(auth.clone(), gateway.clone(), local.clone());
    session.init().await.expect("init");
    let profile = session.sign_in("ANA@example.org", "secret").await.expect("sign in");
    assert_eq!(profile.display_name, "Ana Cruz");
    assert!(session.is_admin());
    assert!(local.get(AUTH_TOKEN).await.expect("read").is_some());

    let tracker = ScanTracker::new(local.clone(), 10);
    tracker.record_scan().await.expect("scan");
    let progress = tracker.record_scan().await.expect("scan");
    assert_eq!((progress.scans, progress.points), (2, 20));

    let reopened = FileStore::open(&path).await.expect("reopen");
    assert_eq!(reopened.get_counter(SCAN_COUNT).await.expect("read"), 2);

    session.sign_out().await.expect("sign out");
    assert!(!session.state().is_signed_in());
    assert!(!session.is_admin());
    assert_eq!(local.get(AUTH_TOKEN).await.expect("read"), None);
    assert_eq!(tracker.progress().await.expect("progress").scans, 0);

    let reopened = FileStore::open(&path).await.expect("reopen");
    assert_eq!(reopened.get(SCAN_COUNT).await.expect("read"), None);
}

#[tokio::test]
async fn test_wrong_password_keeps_signed_out() {
    let auth = Arc::new(MemoryAuth::new());
    auth.register("ben@example.org", "secret", json!({}));
    let local = Arc::new(treetag_local::MemoryStore::new());
    let session = SessionStore::new(auth, helpers::gateway(), local.clone());
    session.init().await.expect("init");

    let err = session.sign_in("ben@example.org", "nope").await.expect_err("rejected");
    assert_eq!(err.kind, ErrorKind::Authentication);
    assert!(!session.state().is_signed_in());
    assert_eq!(local.get(AUTH_TOKEN).await.expect("read"), None);
}

#[tokio::test]
async fn test_missing_profile_falls_back_to_auth_metadata() {
    let auth = Arc::new(MemoryAuth::new());
    auth.register("carla@example.org", "secret", json!({ "name": "Carla" }));
    let gateway = helpers::gateway();
    gateway.fail_table(tables::PROFILES, "relation does not exist");
    let session = SessionStore::new(auth, gateway, Arc::new(treetag_local::MemoryStore::new()));
    session.init().await.expect("init");

    let profile = session.sign_in("carla@example.org", "secret").await.expect("sign in");
    assert_eq!(profile.display_name, "Carla");
    assert_eq!(profile.email, "carla@example.org");
    assert!(!profile.is_admin());
    assert!(session.state().is_signed_in());
}

#[tokio::test]
async fn test_scanned_url_resolves_to_field_record() {
    let gateway = helpers::gateway();
    helpers::seed_field_data(&gateway, 3);
    let trees = TreeService::new(gateway.clone());

    let payload = QrPayload::for_field_record("https://treetag.example/", "f-01");
    let id = QrPayload::parse(payload.url()).expect("id");
    assert_eq!(id, "f-01");

    let record = trees.fetch_field_record(&id).await.expect("found");
    assert_eq!(record.profile.common_name, "Angsana");
    assert_eq!(record.coordinates.location, "North Park");
    assert_eq!(record.location_id, Some(1));

    let missing = trees.fetch_field_record("f-99").await;
    assert_matches!(missing, Err(e) if e.kind == ErrorKind::NotFound);
}
