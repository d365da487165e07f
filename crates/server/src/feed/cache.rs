use std::collections::HashMap;
use std::time::{Duration, Instant};

use chirp_shared::constants::{DEEP_PAGE_TTL_SECS, FIRST_PAGE_TTL_SECS};
use tokio::sync::RwLock;

use crate::models::ChirpView;

/// Cache key for one assembled feed page. The viewer is part of the key
/// because `likedByViewer` is baked into the stored views.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedCacheKey {
    pub kind: String,
    pub viewer_id: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

struct CacheEntry {
    items: Vec<ChirpView>,
    inserted_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn expired(&self) -> bool {
        self.inserted_at.elapsed() > self.ttl
    }
}

/// First pages go stale faster than deep-pagination pages.
pub fn ttl_for_offset(offset: i64) -> Duration {
    if offset == 0 {
        Duration::from_secs(FIRST_PAGE_TTL_SECS)
    } else {
        Duration::from_secs(DEEP_PAGE_TTL_SECS)
    }
}

/// Per-process TTL cache for assembled feed pages. Expired entries are
/// treated as absent on read; there is no eviction beyond TTL expiry. Lives
/// in `AppState` and is guarded for the multi-threaded runtime.
pub struct FeedCache {
    entries: RwLock<HashMap<FeedCacheKey, CacheEntry>>,
}

impl FeedCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &FeedCacheKey) -> Option<Vec<ChirpView>> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) if !entry.expired() => Some(entry.items.clone()),
            _ => None,
        }
    }

    pub async fn set(&self, key: FeedCacheKey, items: Vec<ChirpView>, ttl: Duration) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            CacheEntry {
                items,
                inserted_at: Instant::now(),
                ttl,
            },
        );
    }

    /// Blanket invalidation, called after any mutation that can change feed
    /// contents (chirp create/delete, react/unreact, showcase update).
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

impl Default for FeedCache {
    fn default() -> Self {
        Self::new()
    }
}
