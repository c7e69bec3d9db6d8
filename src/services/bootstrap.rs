//! Startup data preparation
//!
//! Earlier generations launched seeding, normalization and sync kickoff as
//! independent fire-and-forget tasks; here they run as one explicit,
//! awaited sequence so the default categories exist before anything reads
//! them.

use crate::domain::taxonomy::CategoryKey;
use crate::domain::Category;
use crate::infrastructure::stores::{LocalCategoryStore, LocalItemStore, StoreError};
use strum::IntoEnumIterator;
use tracing::{debug, info};

/// Seed the global default categories when the table is empty. Idempotent:
/// defaults upsert under the global owner.
pub async fn seed_default_categories(store: &dyn LocalCategoryStore) -> Result<(), StoreError> {
    if store.count().await? > 0 {
        debug!("categories already present, skipping seed");
        return Ok(());
    }

    let defaults: Vec<Category> = CategoryKey::iter()
        .map(|key| Category::default_entry(key.as_key(), key.legacy_resource_id()))
        .collect();
    info!(count = defaults.len(), "seeding default categories");
    store.upsert_many(defaults).await
}

/// One-time normalization of legacy item rows onto canonical category keys.
///
/// Items written by older generations carry either a legacy resource id or
/// a locale-rendered label in `category_key`. Rows that resolve to a
/// canonical key are rewritten and marked dirty so the next push mirrors
/// the fix to remote. Free-text categories are left alone. Returns the
/// number of rows changed.
pub async fn normalize_item_categories(store: &dyn LocalItemStore) -> Result<usize, StoreError> {
    let items = store.get_all().await?;
    let mut changed = 0;

    for item in items {
        let resolved = if item.category_label_id != 0 {
            CategoryKey::from_legacy_resource_id(item.category_label_id)
        } else {
            crate::domain::taxonomy::resolve_key_from_text(&item.category_key)
        };

        let Some(key) = resolved else { continue };
        if item.category_key == key.as_key()
            && item.category_label_id == key.legacy_resource_id()
        {
            continue;
        }

        let mut normalized = item.marked_dirty();
        normalized.category_key = key.as_key().to_string();
        normalized.category_label_id = key.legacy_resource_id();
        store.update(normalized).await?;
        changed += 1;
    }

    if changed > 0 {
        info!(changed, "normalized legacy item categories");
    }
    Ok(changed)
}
