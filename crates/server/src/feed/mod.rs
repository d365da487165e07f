pub mod aggregates;
pub mod assembler;
pub mod cache;
pub mod pagination;

use std::collections::HashSet;

use sqlx::SqlitePool;

use crate::models::{Chirp, ChirpView, FeedPage};
use crate::AppState;
use cache::FeedCacheKey;

/// Which timeline a feed page is drawn from. "For you" is served
/// reverse-chronological; personalized ranking is intentionally not
/// implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    ForYou,
    Following,
}

impl FeedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedKind::ForYou => "for-you",
            FeedKind::Following => "following",
        }
    }

    pub fn parse(s: Option<&str>) -> FeedKind {
        match s {
            Some("following") => FeedKind::Following,
            _ => FeedKind::ForYou,
        }
    }
}

/// Load one page of the main feed through the cache. Cache misses query the
/// top-level chirps, fan out the aggregate fetchers, assemble the views and
/// store the page under `(kind, viewer, limit, offset)`.
pub async fn load_feed_page(
    state: &AppState,
    viewer_id: Option<&str>,
    kind: FeedKind,
    limit: i64,
    offset: i64,
) -> FeedPage {
    // A following feed needs a signed-in viewer; fall back to the anonymous
    // timeline otherwise.
    let kind = match (kind, viewer_id) {
        (FeedKind::Following, None) => FeedKind::ForYou,
        (k, _) => k,
    };

    let key = FeedCacheKey {
        kind: kind.as_str().to_string(),
        viewer_id: viewer_id.map(|v| v.to_string()),
        limit,
        offset,
    };

    if let Some(items) = state.feed_cache.get(&key).await {
        let has_more = items.len() as i64 == limit;
        return FeedPage { items, has_more };
    }

    let rows = match kind {
        FeedKind::ForYou => sqlx::query_as::<_, Chirp>(
            "SELECT * FROM chirps WHERE reply_to_id IS NULL ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&state.db)
        .await
        .unwrap_or_default(),
        FeedKind::Following => sqlx::query_as::<_, Chirp>(
            r#"SELECT * FROM chirps
               WHERE reply_to_id IS NULL
                 AND author_id IN (SELECT following_id FROM follows WHERE follower_id = ?)
               ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"#,
        )
        .bind(viewer_id.unwrap_or(""))
        .bind(limit)
        .bind(offset)
        .fetch_all(&state.db)
        .await
        .unwrap_or_default(),
    };

    let has_more = rows.len() as i64 == limit;
    let items = assemble_chirps(&state.db, viewer_id, rows).await;

    let ttl = cache::ttl_for_offset(offset);
    state.feed_cache.set(key, items.clone(), ttl).await;

    FeedPage { items, has_more }
}

/// Join raw chirp rows with their authors and aggregates. The three aggregate
/// fetchers are issued concurrently and joined before assembly; any one of
/// them failing degrades that facet to zeros rather than failing the page.
pub async fn assemble_chirps(
    db: &SqlitePool,
    viewer_id: Option<&str>,
    rows: Vec<Chirp>,
) -> Vec<ChirpView> {
    let ids: Vec<String> = rows.iter().map(|c| c.id.clone()).collect();

    let author_ids: Vec<String> = {
        let mut seen = HashSet::new();
        rows.iter()
            .filter(|c| seen.insert(c.author_id.clone()))
            .map(|c| c.author_id.clone())
            .collect()
    };

    let (authors, reaction_counts, reply_counts, liked) = tokio::join!(
        aggregates::author_map(db, &author_ids),
        aggregates::reaction_counts(db, &ids),
        aggregates::reply_counts(db, &ids),
        aggregates::liked_chirp_ids(db, viewer_id, &ids),
    );

    let agg = assembler::Aggregates {
        reaction_counts,
        reply_counts,
        liked,
    };

    assembler::assemble_views(rows, &authors, &agg)
}
