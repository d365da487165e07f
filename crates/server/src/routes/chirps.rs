use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use regex_lite::Regex;
use std::sync::Arc;

use chirp_shared::constants::{CRYSTALS_PER_REPLY, FEED_PAGE_SIZE, MAX_FEED_PAGE_SIZE};
use chirp_shared::validation::validate_chirp_content;

use crate::feed::{self, FeedKind};
use crate::models::{AuthUser, Chirp, CreateChirpRequest, FeedPage, FeedQuery, MaybeAuthUser};
use crate::routes::crystals::award_crystals;
use crate::routes::notifications::create_notification;
use crate::AppState;

fn page_params(query: &FeedQuery) -> (i64, i64) {
    let limit = query
        .limit
        .unwrap_or(FEED_PAGE_SIZE)
        .clamp(1, MAX_FEED_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0).max(0);
    (limit, offset)
}

/// Notify every user @mentioned in the content. Self-mentions are skipped by
/// the notification helper.
async fn notify_mentions(state: &AppState, author_id: &str, chirp_id: &str, content: &str) {
    let re = match Regex::new(r"@([a-z0-9_]{3,24})") {
        Ok(re) => re,
        Err(_) => return,
    };

    for cap in re.captures_iter(content) {
        let handle = &cap[1];
        let mentioned = sqlx::query_scalar::<_, String>(
            "SELECT id FROM users WHERE handle = ? OR custom_handle = ?",
        )
        .bind(handle)
        .bind(handle)
        .fetch_optional(&state.db)
        .await
        .ok()
        .flatten();

        if let Some(user_id) = mentioned {
            create_notification(&state.db, &user_id, "mention", author_id, Some(chirp_id)).await;
        }
    }
}

/// POST /api/chirps
pub async fn create_chirp(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(body): Json<CreateChirpRequest>,
) -> impl IntoResponse {
    if let Err(msg) = validate_chirp_content(&body.content) {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": msg})),
        )
            .into_response();
    }
    let content = body.content.trim().to_string();

    // A reply must point at an existing chirp
    let parent_author = if let Some(reply_to_id) = &body.reply_to_id {
        let author = sqlx::query_scalar::<_, String>("SELECT author_id FROM chirps WHERE id = ?")
            .bind(reply_to_id)
            .fetch_optional(&state.db)
            .await
            .ok()
            .flatten();

        match author {
            Some(a) => Some(a),
            None => {
                return (
                    StatusCode::NOT_FOUND,
                    Json(serde_json::json!({"error": "Chirp being replied to not found"})),
                )
                    .into_response()
            }
        }
    } else {
        None
    };

    if let Some(repost_of_id) = &body.repost_of_id {
        let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM chirps WHERE id = ?")
            .bind(repost_of_id)
            .fetch_one(&state.db)
            .await
            .unwrap_or(0);

        if exists == 0 {
            return (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"error": "Chirp being reposted not found"})),
            )
                .into_response();
        }
    }

    let chirp_id = uuid::Uuid::new_v4().to_string();

    // Thread placement: a starter's thread id is its own id at order 0; a
    // continuation takes the next order in its thread.
    let (thread_id, thread_order, is_thread_starter) = if body.start_thread {
        (Some(chirp_id.clone()), Some(0i64), 1i64)
    } else if let Some(requested) = &body.thread_id {
        let thread = sqlx::query_as::<_, (String, i64)>(
            "SELECT author_id, thread_order FROM chirps WHERE thread_id = ? ORDER BY thread_order DESC LIMIT 1",
        )
        .bind(requested)
        .fetch_optional(&state.db)
        .await
        .ok()
        .flatten();

        match thread {
            Some((thread_author, max_order)) if thread_author == user.id => {
                (Some(requested.clone()), Some(max_order + 1), 0i64)
            }
            Some(_) => {
                return (
                    StatusCode::FORBIDDEN,
                    Json(serde_json::json!({"error": "Cannot add to another user's thread"})),
                )
                    .into_response()
            }
            None => {
                return (
                    StatusCode::NOT_FOUND,
                    Json(serde_json::json!({"error": "Thread not found"})),
                )
                    .into_response()
            }
        }
    } else {
        (None, None, 0i64)
    };

    let now = chrono::Utc::now().to_rfc3339();

    let result = sqlx::query(
        r#"INSERT INTO chirps
           (id, author_id, content, reply_to_id, thread_id, thread_order, is_thread_starter,
            repost_of_id, image_url, image_alt, image_width, image_height, created_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(&chirp_id)
    .bind(&user.id)
    .bind(&content)
    .bind(&body.reply_to_id)
    .bind(&thread_id)
    .bind(thread_order)
    .bind(is_thread_starter)
    .bind(&body.repost_of_id)
    .bind(&body.image_url)
    .bind(&body.image_alt)
    .bind(body.image_width)
    .bind(body.image_height)
    .bind(&now)
    .execute(&state.db)
    .await;

    if let Err(e) = result {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("Failed to create chirp: {}", e)})),
        )
            .into_response();
    }

    // Side effects: reply notification + crystals for the parent author,
    // mention notifications
    if let Some(parent_author) = &parent_author {
        create_notification(&state.db, parent_author, "reply", &user.id, Some(&chirp_id)).await;
        if parent_author != &user.id {
            award_crystals(&state.db, parent_author, CRYSTALS_PER_REPLY, "reply_received").await;
        }
    }
    notify_mentions(&state, &user.id, &chirp_id, &content).await;

    state.feed_cache.clear().await;

    let row = sqlx::query_as::<_, Chirp>("SELECT * FROM chirps WHERE id = ?")
        .bind(&chirp_id)
        .fetch_one(&state.db)
        .await;

    match row {
        Ok(row) => {
            let views = feed::assemble_chirps(&state.db, Some(&user.id), vec![row]).await;
            (StatusCode::CREATED, Json(views.into_iter().next())).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("Failed to load chirp: {}", e)})),
        )
            .into_response(),
    }
}

/// GET /api/chirps?kind=&limit=&offset=
pub async fn get_feed(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(user): MaybeAuthUser,
    Query(query): Query<FeedQuery>,
) -> impl IntoResponse {
    let (limit, offset) = page_params(&query);
    let kind = FeedKind::parse(query.kind.as_deref());
    let viewer_id = user.as_ref().map(|u| u.id.as_str());

    let page = feed::load_feed_page(&state, viewer_id, kind, limit, offset).await;
    Json(page).into_response()
}

/// GET /api/chirps/:chirpId
pub async fn get_chirp(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(user): MaybeAuthUser,
    Path(chirp_id): Path<String>,
) -> impl IntoResponse {
    let row = sqlx::query_as::<_, Chirp>("SELECT * FROM chirps WHERE id = ?")
        .bind(&chirp_id)
        .fetch_optional(&state.db)
        .await
        .ok()
        .flatten();

    let row = match row {
        Some(r) => r,
        None => {
            return (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"error": "Chirp not found"})),
            )
                .into_response()
        }
    };

    let viewer_id = user.as_ref().map(|u| u.id.as_str());
    let views = feed::assemble_chirps(&state.db, viewer_id, vec![row]).await;
    Json(views.into_iter().next()).into_response()
}

/// GET /api/chirps/:chirpId/replies
pub async fn list_replies(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(user): MaybeAuthUser,
    Path(chirp_id): Path<String>,
    Query(query): Query<FeedQuery>,
) -> impl IntoResponse {
    let (limit, offset) = page_params(&query);

    let rows = sqlx::query_as::<_, Chirp>(
        "SELECT * FROM chirps WHERE reply_to_id = ? ORDER BY created_at ASC, id ASC LIMIT ? OFFSET ?",
    )
    .bind(&chirp_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.db)
    .await
    .unwrap_or_default();

    let has_more = rows.len() as i64 == limit;
    let viewer_id = user.as_ref().map(|u| u.id.as_str());
    let items = feed::assemble_chirps(&state.db, viewer_id, rows).await;

    Json(FeedPage { items, has_more }).into_response()
}

/// DELETE /api/chirps/:chirpId
pub async fn delete_chirp(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(chirp_id): Path<String>,
) -> impl IntoResponse {
    let author_id = sqlx::query_scalar::<_, String>("SELECT author_id FROM chirps WHERE id = ?")
        .bind(&chirp_id)
        .fetch_optional(&state.db)
        .await
        .ok()
        .flatten();

    let author_id = match author_id {
        Some(a) => a,
        None => {
            return (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"error": "Chirp not found"})),
            )
                .into_response()
        }
    };

    if author_id != user.id {
        return (
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({"error": "Cannot delete another user's chirp"})),
        )
            .into_response();
    }

    let result = sqlx::query("DELETE FROM chirps WHERE id = ?")
        .bind(&chirp_id)
        .execute(&state.db)
        .await;

    if let Err(e) = result {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("Failed to delete chirp: {}", e)})),
        )
            .into_response();
    }

    state.feed_cache.clear().await;

    Json(serde_json::json!({"deleted": true})).into_response()
}
