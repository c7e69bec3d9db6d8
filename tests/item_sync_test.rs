//! Item sync protocol integration tests

mod common;

use common::Harness;
use pretty_assertions::assert_eq;
use trove_core::domain::Item;
use trove_core::infrastructure::stores::LocalItemStore;
use trove_core::services::SyncError;

fn clean_item(id: &str, owner: &str, name: &str) -> Item {
    let mut item = Item::new(owner, name, "Garage", "tools");
    item.id = id.to_string();
    item.dirty = false;
    item
}

fn dirty_item(id: &str, owner: &str, name: &str) -> Item {
    let mut item = clean_item(id, owner, name);
    item.dirty = true;
    item
}

#[tokio::test]
async fn push_is_idempotent() {
    let h = Harness::signed_in("u1");

    // A clean item never reaches the remote.
    h.local_items
        .insert(clean_item("a", "u1", "Drill"))
        .await
        .unwrap();
    h.items.push_local_to_remote().await.unwrap();
    assert_eq!(h.remote_items.set_call_count(), 0);

    // A dirty item is pushed once; repeating the push changes nothing.
    h.local_items
        .insert(dirty_item("b", "u1", "Saw"))
        .await
        .unwrap();
    h.items.push_local_to_remote().await.unwrap();
    let after_first = h.remote_items.document("b").await.unwrap();
    assert!(!after_first.dirty, "remote payload carries dirty = false");
    assert_eq!(h.remote_items.set_call_count(), 1);

    h.items.push_local_to_remote().await.unwrap();
    assert_eq!(h.remote_items.set_call_count(), 1, "nothing left to push");
    assert_eq!(h.remote_items.document("b").await.unwrap(), after_first);

    let local = h.local_items.get_by_id("b").await.unwrap().unwrap();
    assert!(!local.dirty);
}

#[tokio::test]
async fn pull_never_clobbers_an_unpushed_edit() {
    let h = Harness::signed_in("u1");

    let local_edit = dirty_item("a", "u1", "Drill (engraved)");
    h.local_items.insert(local_edit.clone()).await.unwrap();
    h.remote_items.seed(clean_item("a", "u1", "Drill")).await;

    // Dirty local row survives the pull untouched.
    h.items.pull_remote_to_local().await.unwrap();
    let kept = h.local_items.get_by_id("a").await.unwrap().unwrap();
    assert_eq!(kept, local_edit);

    // After a successful push the local edit wins remotely...
    h.items.push_local_to_remote().await.unwrap();
    assert_eq!(
        h.remote_items.document("a").await.unwrap().name,
        "Drill (engraved)"
    );

    // ...and only now may a newer remote version be adopted.
    h.remote_items
        .seed(clean_item("a", "u1", "Drill (relabeled)"))
        .await;
    h.items.pull_remote_to_local().await.unwrap();
    let adopted = h.local_items.get_by_id("a").await.unwrap().unwrap();
    assert_eq!(adopted.name, "Drill (relabeled)");
    assert!(!adopted.dirty);
}

#[tokio::test]
async fn pull_inserts_unknown_remote_items_clean() {
    let h = Harness::signed_in("u1");
    let mut remote = clean_item("a", "u1", "Drill");
    remote.dirty = true; // whatever the document claims, local copies land clean
    h.remote_items.seed(remote).await;

    h.items.pull_remote_to_local().await.unwrap();

    let inserted = h.local_items.get_by_id("a").await.unwrap().unwrap();
    assert_eq!(inserted.name, "Drill");
    assert!(!inserted.dirty);
}

#[tokio::test]
async fn push_isolates_per_item_failures() {
    let h = Harness::signed_in("u1");
    for (id, name) in [("a", "Drill"), ("b", "Saw"), ("c", "Hammer")] {
        h.local_items.insert(dirty_item(id, "u1", name)).await.unwrap();
    }
    h.remote_items.fail_writes_for("b").await;

    h.items.push_local_to_remote().await.unwrap();

    assert!(!h.local_items.get_by_id("a").await.unwrap().unwrap().dirty);
    assert!(
        h.local_items.get_by_id("b").await.unwrap().unwrap().dirty,
        "failed item stays dirty for the next cycle"
    );
    assert!(!h.local_items.get_by_id("c").await.unwrap().unwrap().dirty);
    assert!(h.remote_items.document("a").await.is_some());
    assert!(h.remote_items.document("b").await.is_none());
    assert!(h.remote_items.document("c").await.is_some());

    // The retry succeeds once the remote recovers.
    h.remote_items.clear_failures().await;
    h.items.push_local_to_remote().await.unwrap();
    assert!(!h.local_items.get_by_id("b").await.unwrap().unwrap().dirty);
}

#[tokio::test]
async fn offline_push_is_a_noop_and_pull_reports_it() {
    let h = Harness::offline("u1");
    h.local_items
        .insert(dirty_item("c", "u1", "Drill"))
        .await
        .unwrap();

    h.items.push_local_to_remote().await.unwrap();
    assert_eq!(h.remote_items.set_call_count(), 0, "no remote calls offline");
    assert!(h.local_items.get_by_id("c").await.unwrap().unwrap().dirty);

    let err = h.items.pull_remote_to_local().await.unwrap_err();
    assert!(matches!(err, SyncError::Offline));
    assert_eq!(h.remote_items.query_call_count(), 0);
    assert_eq!(h.local_items.get_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn pull_requires_an_authenticated_user() {
    let h = Harness::signed_out();
    let err = h.items.pull_remote_to_local().await.unwrap_err();
    assert!(matches!(err, SyncError::NotAuthenticated));
}

#[tokio::test]
async fn pull_wraps_remote_failures_with_their_message() {
    let h = Harness::signed_in("u1");
    h.remote_items.fail_queries();

    let err = h.items.pull_remote_to_local().await.unwrap_err();
    match err {
        SyncError::Remote(message) => assert!(message.contains("injected query failure")),
        other => panic!("expected SyncError::Remote, got {other:?}"),
    }
}

#[tokio::test]
async fn delete_removes_from_both_stores() {
    let h = Harness::signed_in("u1");
    h.local_items
        .insert(clean_item("a", "u1", "Drill"))
        .await
        .unwrap();
    h.remote_items.seed(clean_item("a", "u1", "Drill")).await;

    h.items.delete_item("a").await.unwrap();
    assert!(h.local_items.get_by_id("a").await.unwrap().is_none());
    assert!(h.remote_items.document("a").await.is_none());
}

#[tokio::test]
async fn delete_offline_still_removes_the_local_row() {
    let h = Harness::offline("u1");
    h.local_items
        .insert(clean_item("a", "u1", "Drill"))
        .await
        .unwrap();
    h.remote_items.seed(clean_item("a", "u1", "Drill")).await;

    h.items.delete_item("a").await.unwrap();
    assert!(h.local_items.get_by_id("a").await.unwrap().is_none());
    assert!(
        h.remote_items.document("a").await.is_some(),
        "remote copy survives until the device is back online"
    );
}
