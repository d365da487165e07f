use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use chirp_shared::constants::CRYSTALS_PER_LIKE;
use chirp_shared::validation::validate_emoji;

use crate::models::AuthUser;
use crate::routes::crystals::award_crystals;
use crate::routes::notifications::create_notification;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ReactRequest {
    pub emoji: String,
}

/// POST /api/chirps/:chirpId/reactions
///
/// One reaction per (user, chirp): reacting again replaces the stored emoji.
/// Only the first reaction notifies and rewards the chirp's author.
pub async fn react(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(chirp_id): Path<String>,
    Json(body): Json<ReactRequest>,
) -> impl IntoResponse {
    if let Err(msg) = validate_emoji(&body.emoji) {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": msg})),
        )
            .into_response();
    }

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

    let existing = sqlx::query_scalar::<_, String>(
        "SELECT id FROM reactions WHERE user_id = ? AND chirp_id = ?",
    )
    .bind(&user.id)
    .bind(&chirp_id)
    .fetch_optional(&state.db)
    .await
    .ok()
    .flatten();

    let now = chrono::Utc::now().to_rfc3339();

    let reaction_id = match existing {
        Some(reaction_id) => {
            // Supersede the prior emoji in place
            let result = sqlx::query("UPDATE reactions SET emoji = ?, created_at = ? WHERE id = ?")
                .bind(&body.emoji)
                .bind(&now)
                .bind(&reaction_id)
                .execute(&state.db)
                .await;

            if let Err(e) = result {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({"error": format!("Failed to update reaction: {}", e)})),
                )
                    .into_response();
            }
            reaction_id
        }
        None => {
            let reaction_id = uuid::Uuid::new_v4().to_string();
            let result = sqlx::query(
                "INSERT INTO reactions (id, user_id, chirp_id, emoji, created_at) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&reaction_id)
            .bind(&user.id)
            .bind(&chirp_id)
            .bind(&body.emoji)
            .bind(&now)
            .execute(&state.db)
            .await;

            if let Err(e) = result {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({"error": format!("Failed to react: {}", e)})),
                )
                    .into_response();
            }

            create_notification(&state.db, &author_id, "like", &user.id, Some(&chirp_id)).await;
            if author_id != user.id {
                award_crystals(&state.db, &author_id, CRYSTALS_PER_LIKE, "like_received").await;
            }
            reaction_id
        }
    };

    state.feed_cache.clear().await;

    Json(serde_json::json!({
        "id": reaction_id,
        "chirpId": chirp_id,
        "userId": user.id,
        "emoji": body.emoji,
        "createdAt": now,
    }))
    .into_response()
}

/// DELETE /api/chirps/:chirpId/reactions
pub async fn unreact(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(chirp_id): Path<String>,
) -> impl IntoResponse {
    let result = sqlx::query("DELETE FROM reactions WHERE user_id = ? AND chirp_id = ?")
        .bind(&user.id)
        .bind(&chirp_id)
        .execute(&state.db)
        .await;

    let removed = match result {
        Ok(r) => r.rows_affected() > 0,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": format!("Failed to remove reaction: {}", e)})),
            )
                .into_response()
        }
    };

    state.feed_cache.clear().await;

    Json(serde_json::json!({"removed": removed})).into_response()
}
