//! Category sync protocol integration tests

mod common;

use common::Harness;
use pretty_assertions::assert_eq;
use trove_core::domain::taxonomy::CategoryKey;
use trove_core::domain::{Category, GLOBAL_OWNER};
use trove_core::infrastructure::stores::LocalCategoryStore;
use trove_core::services::bootstrap::seed_default_categories;

async fn seeded(h: &Harness) {
    seed_default_categories(h.local_categories.as_ref())
        .await
        .unwrap();
}

async fn owned_rows(h: &Harness, owner: &str) -> Vec<Category> {
    h.local_categories
        .get_all_for_owner(owner)
        .await
        .unwrap()
        .into_iter()
        .filter(|c| c.owner_id == owner)
        .collect()
}

#[tokio::test]
async fn adding_a_default_name_never_creates_an_owned_row() {
    let h = Harness::signed_in("u1");
    seeded(&h).await;

    // Canonical key, cased variant and a localized label all collapse onto
    // the seeded default.
    h.categories.add_category("Electronics", 0).await.unwrap();
    h.categories.add_category("  ELECTRONICS ", 0).await.unwrap();
    h.categories.add_category("Elektronik", 0).await.unwrap();

    assert_eq!(owned_rows(&h, "u1").await, vec![]);
}

#[tokio::test]
async fn adding_the_same_free_text_twice_creates_one_row() {
    let h = Harness::signed_in("u1");
    seeded(&h).await;

    h.categories.add_category("Camping Gear", 0).await.unwrap();
    h.categories.add_category("  camping gear ", 0).await.unwrap();
    h.categories.add_category("CAMPING GEAR", 0).await.unwrap();

    let rows = owned_rows(&h, "u1").await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Camping Gear");
    assert!(!rows[0].pending_sync, "online add is pushed immediately");
    assert!(h
        .remote_categories
        .document("u1", "Camping Gear")
        .await
        .is_some());
}

#[tokio::test]
async fn blank_names_are_a_silent_noop() {
    let h = Harness::signed_in("u1");
    seeded(&h).await;
    h.categories.add_category("   ", 0).await.unwrap();
    h.categories.add_category("", 0).await.unwrap();
    assert_eq!(owned_rows(&h, "u1").await, vec![]);
}

#[tokio::test]
async fn anonymous_category_is_claimed_after_login() {
    let h = Harness::signed_out();
    seeded(&h).await;

    h.categories.add_category("Camping", 0).await.unwrap();
    let anonymous = h
        .local_categories
        .find_by_name_for_owner(GLOBAL_OWNER, "Camping")
        .await
        .unwrap()
        .unwrap();
    assert!(anonymous.pending_sync);
    assert_eq!(anonymous.owner_id, GLOBAL_OWNER);

    h.identity.sign_in("u1");
    h.categories.sync_categories().await;

    let claimed = owned_rows(&h, "u1").await;
    assert_eq!(claimed.len(), 1);
    assert_eq!(claimed[0].name, "Camping");
    assert_eq!(claimed[0].owner_id, "u1");
    assert!(!claimed[0].pending_sync);

    // No residual anonymous row; the defaults are all that remain global.
    let globals = owned_rows(&h, GLOBAL_OWNER).await;
    assert!(globals.iter().all(|c| !c.pending_sync));
    assert!(globals.iter().all(|c| c.name != "Camping"));

    assert!(h.remote_categories.document("u1", "Camping").await.is_some());
}

#[tokio::test]
async fn failed_push_leaves_the_category_pending_until_retry() {
    let h = Harness::signed_in("u1");
    seeded(&h).await;
    h.remote_categories.fail_writes_for("Camping").await;

    h.categories.add_category("Camping", 0).await.unwrap();
    let row = h
        .local_categories
        .find_by_name_for_owner("u1", "Camping")
        .await
        .unwrap()
        .unwrap();
    assert!(row.pending_sync, "failed push flips the row back to pending");

    h.remote_categories.clear_failures().await;
    h.categories.sync_categories().await;

    let row = h
        .local_categories
        .find_by_name_for_owner("u1", "Camping")
        .await
        .unwrap()
        .unwrap();
    assert!(!row.pending_sync);
    assert!(h.remote_categories.document("u1", "Camping").await.is_some());
}

#[tokio::test]
async fn local_only_categories_are_pushed_to_remote() {
    let h = Harness::signed_in("u1");
    seeded(&h).await;
    h.local_categories
        .upsert(Category::new("u1", "Workshop"))
        .await
        .unwrap();

    h.categories.sync_categories().await;

    assert!(h.remote_categories.document("u1", "Workshop").await.is_some());
}

#[tokio::test]
async fn remote_categories_are_adopted_with_legacy_annotation() {
    let h = Harness::signed_in("u1");
    seeded(&h).await;

    // A localized default label pushed by an older client, plus a plain
    // custom category.
    h.remote_categories
        .seed("u1", Category::new("u1", "Elektronik"))
        .await;
    h.remote_categories
        .seed("u1", Category::new("u1", "Vinyl"))
        .await;

    h.categories.sync_categories().await;

    let rows = owned_rows(&h, "u1").await;
    let elektronik = rows.iter().find(|c| c.name == "Elektronik").unwrap();
    assert_eq!(
        elektronik.localization_resource_id,
        CategoryKey::Electronics.legacy_resource_id()
    );
    let vinyl = rows.iter().find(|c| c.name == "Vinyl").unwrap();
    assert_eq!(vinyl.localization_resource_id, 0);
    assert!(rows.iter().all(|c| !c.pending_sync));
}

#[tokio::test]
async fn default_keyed_rows_never_enter_the_owned_set() {
    let h = Harness::signed_in("u1");
    seeded(&h).await;

    // A stale duplicate locally and a default-keyed document remotely.
    h.local_categories
        .upsert(Category::new("u1", "tools"))
        .await
        .unwrap();
    h.remote_categories
        .seed("u1", Category::new("u1", "electronics"))
        .await;

    h.categories.sync_categories().await;

    let rows = owned_rows(&h, "u1").await;
    assert!(
        rows.iter().all(|c| c.name != "tools" && c.name != "electronics"),
        "defaults only ever live under the global owner: {rows:?}"
    );
}

#[tokio::test]
async fn sync_without_identity_is_a_noop() {
    let h = Harness::signed_out();
    seeded(&h).await;
    h.categories.add_category("Camping", 0).await.unwrap();

    h.categories.sync_categories().await;

    let row = h
        .local_categories
        .find_by_name_for_owner(GLOBAL_OWNER, "Camping")
        .await
        .unwrap()
        .unwrap();
    assert!(row.pending_sync, "nothing to reconcile with until login");
    assert!(h.remote_categories.document("u1", "Camping").await.is_none());
}

#[tokio::test]
async fn live_list_rescopes_when_identity_changes() {
    let h = Harness::signed_out();
    seeded(&h).await;
    h.local_categories
        .upsert(Category::new("u1", "Workshop"))
        .await
        .unwrap();

    let watcher = h.categories.spawn_identity_watcher();
    h.categories.refresh_live().await;

    let mut live = h.categories.categories();
    let names: Vec<String> = live.borrow().iter().map(|c| c.name.clone()).collect();
    assert!(!names.contains(&"Workshop".to_string()));

    h.identity.sign_in("u1");
    live.changed().await.unwrap();
    let names: Vec<String> = live.borrow().iter().map(|c| c.name.clone()).collect();
    assert!(names.contains(&"Workshop".to_string()));
    assert!(names.contains(&"tools".to_string()), "defaults always included");

    watcher.abort();
}
