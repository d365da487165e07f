use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::models::{AuthUser, MaybeAuthUser};
use crate::routes::notifications::create_notification;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdRequest {
    pub user_id: String,
}

async fn blocked_either_way(db: &sqlx::SqlitePool, a: &str, b: &str) -> bool {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM blocks WHERE (blocker_id = ? AND blocked_id = ?) OR (blocker_id = ? AND blocked_id = ?)",
    )
    .bind(a)
    .bind(b)
    .bind(b)
    .bind(a)
    .fetch_one(db)
    .await
    .unwrap_or(0)
        > 0
}

/// POST /api/follows
pub async fn follow(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(body): Json<UserIdRequest>,
) -> impl IntoResponse {
    if body.user_id == user.id {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Cannot follow yourself"})),
        )
            .into_response();
    }

    let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE id = ?")
        .bind(&body.user_id)
        .fetch_one(&state.db)
        .await
        .unwrap_or(0);

    if exists == 0 {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "User not found"})),
        )
            .into_response();
    }

    // A block in either direction forbids the edge
    if blocked_either_way(&state.db, &user.id, &body.user_id).await {
        return (
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({"error": "Cannot follow this user"})),
        )
            .into_response();
    }

    let now = chrono::Utc::now().to_rfc3339();
    let result = sqlx::query(
        "INSERT OR IGNORE INTO follows (follower_id, following_id, created_at) VALUES (?, ?, ?)",
    )
    .bind(&user.id)
    .bind(&body.user_id)
    .bind(&now)
    .execute(&state.db)
    .await;

    match result {
        Ok(r) if r.rows_affected() > 0 => {
            create_notification(&state.db, &body.user_id, "follow", &user.id, None).await;
            Json(serde_json::json!({"following": true})).into_response()
        }
        Ok(_) => Json(serde_json::json!({"following": true})).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("Failed to follow: {}", e)})),
        )
            .into_response(),
    }
}

/// DELETE /api/follows/:userId
pub async fn unfollow(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let result = sqlx::query("DELETE FROM follows WHERE follower_id = ? AND following_id = ?")
        .bind(&user.id)
        .bind(&user_id)
        .execute(&state.db)
        .await;

    match result {
        Ok(_) => Json(serde_json::json!({"following": false})).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("Failed to unfollow: {}", e)})),
        )
            .into_response(),
    }
}

/// GET /api/users/:userId/follow-stats
pub async fn follow_stats(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let followers = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM follows WHERE following_id = ?",
    )
    .bind(&user_id)
    .fetch_one(&state.db)
    .await
    .unwrap_or(0);

    let following = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM follows WHERE follower_id = ?",
    )
    .bind(&user_id)
    .fetch_one(&state.db)
    .await
    .unwrap_or(0);

    let followed_by_viewer = match &viewer {
        Some(v) => sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM follows WHERE follower_id = ? AND following_id = ?",
        )
        .bind(&v.id)
        .bind(&user_id)
        .fetch_one(&state.db)
        .await
        .unwrap_or(0)
            > 0,
        None => false,
    };

    Json(serde_json::json!({
        "followers": followers,
        "following": following,
        "followedByViewer": followed_by_viewer,
    }))
    .into_response()
}

/// POST /api/blocks
pub async fn block(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(body): Json<UserIdRequest>,
) -> impl IntoResponse {
    if body.user_id == user.id {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Cannot block yourself"})),
        )
            .into_response();
    }

    let now = chrono::Utc::now().to_rfc3339();
    let result = sqlx::query(
        "INSERT OR IGNORE INTO blocks (blocker_id, blocked_id, created_at) VALUES (?, ?, ?)",
    )
    .bind(&user.id)
    .bind(&body.user_id)
    .bind(&now)
    .execute(&state.db)
    .await;

    if let Err(e) = result {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("Failed to block: {}", e)})),
        )
            .into_response();
    }

    // A block edge cannot coexist with follow edges in either direction
    let _ = sqlx::query(
        "DELETE FROM follows WHERE (follower_id = ? AND following_id = ?) OR (follower_id = ? AND following_id = ?)",
    )
    .bind(&user.id)
    .bind(&body.user_id)
    .bind(&body.user_id)
    .bind(&user.id)
    .execute(&state.db)
    .await;

    Json(serde_json::json!({"blocked": true})).into_response()
}

/// DELETE /api/blocks/:userId
pub async fn unblock(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let result = sqlx::query("DELETE FROM blocks WHERE blocker_id = ? AND blocked_id = ?")
        .bind(&user.id)
        .bind(&user_id)
        .execute(&state.db)
        .await;

    match result {
        Ok(_) => Json(serde_json::json!({"blocked": false})).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("Failed to unblock: {}", e)})),
        )
            .into_response(),
    }
}
