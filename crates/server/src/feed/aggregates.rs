use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::time::Duration;

use chirp_shared::constants::AGGREGATE_TIMEOUT_SECS;
use sqlx::SqlitePool;
use tokio::time::timeout;

use crate::models::AuthorRow;

fn in_clause(n: usize) -> String {
    vec!["?"; n].join(",")
}

/// Run one aggregate query under the fixed per-call timeout. Failures and
/// timeouts degrade to `None`; the caller substitutes an empty lookup so the
/// feed renders with zero counts instead of erroring.
async fn guarded<T, F>(what: &str, fut: F) -> Option<T>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match timeout(Duration::from_secs(AGGREGATE_TIMEOUT_SECS), fut).await {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            tracing::warn!("{} query failed: {}", what, e);
            None
        }
        Err(_) => {
            tracing::warn!("{} query timed out", what);
            None
        }
    }
}

/// Reaction count per chirp id. Counts are aggregated in SQL rather than by
/// shipping raw reaction rows to the caller.
pub async fn reaction_counts(db: &SqlitePool, ids: &[String]) -> HashMap<String, i64> {
    if ids.is_empty() {
        return HashMap::new();
    }

    let sql = format!(
        "SELECT chirp_id, COUNT(*) FROM reactions WHERE chirp_id IN ({}) GROUP BY chirp_id",
        in_clause(ids.len())
    );
    let mut query = sqlx::query_as::<_, (String, i64)>(&sql);
    for id in ids {
        query = query.bind(id);
    }

    guarded("reaction count", query.fetch_all(db))
        .await
        .map(|rows| rows.into_iter().collect())
        .unwrap_or_default()
}

/// Reply count per chirp id.
pub async fn reply_counts(db: &SqlitePool, ids: &[String]) -> HashMap<String, i64> {
    if ids.is_empty() {
        return HashMap::new();
    }

    let sql = format!(
        "SELECT reply_to_id, COUNT(*) FROM chirps WHERE reply_to_id IN ({}) GROUP BY reply_to_id",
        in_clause(ids.len())
    );
    let mut query = sqlx::query_as::<_, (String, i64)>(&sql);
    for id in ids {
        query = query.bind(id);
    }

    guarded("reply count", query.fetch_all(db))
        .await
        .map(|rows| rows.into_iter().collect())
        .unwrap_or_default()
}

/// The subset of `ids` the viewer has reacted to. Anonymous viewers get the
/// empty set without a query.
pub async fn liked_chirp_ids(
    db: &SqlitePool,
    viewer_id: Option<&str>,
    ids: &[String],
) -> HashSet<String> {
    let viewer_id = match viewer_id {
        Some(v) => v,
        None => return HashSet::new(),
    };
    if ids.is_empty() {
        return HashSet::new();
    }

    let sql = format!(
        "SELECT chirp_id FROM reactions WHERE user_id = ? AND chirp_id IN ({})",
        in_clause(ids.len())
    );
    let mut query = sqlx::query_scalar::<_, String>(&sql);
    query = query.bind(viewer_id);
    for id in ids {
        query = query.bind(id);
    }

    guarded("liked set", query.fetch_all(db))
        .await
        .map(|rows| rows.into_iter().collect())
        .unwrap_or_default()
}

/// Author rows for a set of user ids, keyed by id.
pub async fn author_map(db: &SqlitePool, author_ids: &[String]) -> HashMap<String, AuthorRow> {
    if author_ids.is_empty() {
        return HashMap::new();
    }

    let sql = format!(
        "SELECT id, handle, custom_handle, first_name, last_name, profile_image_url FROM users WHERE id IN ({})",
        in_clause(author_ids.len())
    );
    let mut query = sqlx::query_as::<_, AuthorRow>(&sql);
    for id in author_ids {
        query = query.bind(id);
    }

    guarded("author lookup", query.fetch_all(db))
        .await
        .map(|rows| rows.into_iter().map(|a| (a.id.clone(), a)).collect())
        .unwrap_or_default()
}
