use std::sync::Arc;
use std::time::Duration;

use pocketeer_core::error::{PocketeerError, Result};
use pocketeer_core::types::{AccessToken, BookmarkCollection};
use pocketeer_integrations::pocket::{ListQuery, PocketApi};
use pocketeer_store::{keys, KvStore};

use crate::normalize::normalize;

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Serves the bookmark list from the store, refetching from the provider on
/// a miss or when the caller asks for a refresh.
pub struct BookmarkCache {
    api: Arc<dyn PocketApi>,
    store: Arc<dyn KvStore>,
    ttl: Duration,
}

impl BookmarkCache {
    pub fn new(api: Arc<dyn PocketApi>, store: Arc<dyn KvStore>, ttl: Duration) -> Self {
        Self { api, store, ttl }
    }

    pub async fn get_bookmarks(&self, favorite: &str, force_refresh: bool) -> Result<BookmarkCollection> {
        if !force_refresh {
            if let Some(collection) = self.cached().await? {
                tracing::info!(favorite, count = collection.len(), "bookmarks_cache_hit");
                return Ok(collection);
            }
        }

        let access_token = self
            .store
            .get(keys::ACCESS_TOKEN)
            .await?
            .filter(|token| !token.is_empty())
            .map(AccessToken::new)
            .ok_or(PocketeerError::Unauthorized)?;

        let list = self
            .api
            .list_items(&access_token, &ListQuery::newest(favorite))
            .await?;
        let collection = normalize(&list);

        let payload = serde_json::to_string(&collection)
            .map_err(|e| PocketeerError::Store(format!("failed to encode bookmarks: {e}")))?;
        self.store
            .set(keys::BOOKMARKS, &payload, Some(self.ttl))
            .await?;

        tracing::info!(
            favorite,
            force_refresh,
            upstream = list.len(),
            count = collection.len(),
            "bookmarks_refreshed"
        );
        Ok(collection)
    }

    /// The parsed cache entry. An unreadable entry counts as a miss.
    pub async fn cached(&self) -> Result<Option<BookmarkCollection>> {
        let Some(raw) = self.store.get(keys::BOOKMARKS).await? else {
            return Ok(None);
        };
        if raw.is_empty() {
            return Ok(None);
        }

        match serde_json::from_str(&raw) {
            Ok(collection) => Ok(Some(collection)),
            Err(e) => {
                tracing::warn!(error = %e, "bookmarks_cache_unreadable");
                Ok(None)
            }
        }
    }
}
