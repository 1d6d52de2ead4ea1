use pocketeer_core::types::{BookmarkCollection, BookmarkRecord};
use pocketeer_integrations::pocket::ItemList;
use serde::Deserialize;

/// Project the provider's item mapping onto [`BookmarkRecord`]s, keeping the
/// provider's order. Extra fields are dropped; entries missing one of the
/// five fields are skipped.
pub fn normalize(list: &ItemList) -> BookmarkCollection {
    let mut bookmark = Vec::with_capacity(list.len());

    for (key, value) in list.entries() {
        match BookmarkRecord::deserialize(value) {
            Ok(record) => bookmark.push(record),
            Err(e) => {
                tracing::warn!(key = key.unwrap_or("-"), error = %e, "bookmark_entry_skipped");
            }
        }
    }

    BookmarkCollection { bookmark }
}
