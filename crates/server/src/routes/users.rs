use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use chirp_shared::constants::{FEED_PAGE_SIZE, MAX_FEED_PAGE_SIZE};
use chirp_shared::validation::{validate_bio, validate_handle};

use crate::feed;
use crate::models::{AuthUser, Chirp, CollectedCard, FeedPage, FeedQuery, MaybeAuthUser, User};
use crate::AppState;

async fn find_user_by_handle(db: &sqlx::SqlitePool, handle: &str) -> Option<User> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE handle = ? OR custom_handle = ?")
        .bind(handle)
        .bind(handle)
        .fetch_optional(db)
        .await
        .ok()
        .flatten()
}

fn profile_json(user: &User) -> serde_json::Value {
    serde_json::json!({
        "id": user.id,
        "handle": user.display_handle(),
        "customHandle": user.custom_handle,
        "firstName": user.first_name,
        "lastName": user.last_name,
        "bio": user.bio,
        "profileImageUrl": user.profile_image_url,
        "bannerImageUrl": user.banner_image_url,
        "isSubscribed": user.is_subscribed != 0,
        "createdAt": user.created_at,
    })
}

/// GET /api/users/me
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> impl IntoResponse {
    let row = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(&user.id)
        .fetch_optional(&state.db)
        .await
        .ok()
        .flatten();

    let row = match row {
        Some(r) => r,
        None => {
            return (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"error": "User not found"})),
            )
                .into_response()
        }
    };

    let mut profile = profile_json(&row);
    profile["email"] = serde_json::json!(row.email);
    profile["crystalBalance"] = serde_json::json!(row.crystal_balance);
    profile["linkShareEligible"] = serde_json::json!(row.link_share_eligible != 0);

    Json(profile).into_response()
}

/// PATCH /api/users/me
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    let row = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(&user.id)
        .fetch_optional(&state.db)
        .await
        .ok()
        .flatten();

    let row = match row {
        Some(r) => r,
        None => {
            return (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"error": "User not found"})),
            )
                .into_response()
        }
    };

    let mut updated_any = false;

    if let Some(bio) = body.get("bio") {
        let bio = bio.as_str().map(|s| s.to_string());
        if let Some(b) = &bio {
            if let Err(msg) = validate_bio(b) {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({"error": msg})),
                )
                    .into_response();
            }
        }
        let _ = sqlx::query("UPDATE users SET bio = ? WHERE id = ?")
            .bind(&bio)
            .bind(&user.id)
            .execute(&state.db)
            .await;
        updated_any = true;
    }

    for (key, column) in [
        ("firstName", "first_name"),
        ("lastName", "last_name"),
        ("profileImageUrl", "profile_image_url"),
        ("bannerImageUrl", "banner_image_url"),
    ] {
        if let Some(value) = body.get(key) {
            let value = value.as_str().map(|s| s.to_string());
            let sql = format!("UPDATE users SET {} = ? WHERE id = ?", column);
            let _ = sqlx::query(&sql)
                .bind(&value)
                .bind(&user.id)
                .execute(&state.db)
                .await;
            updated_any = true;
        }
    }

    if let Some(custom_handle) = body.get("customHandle").and_then(|v| v.as_str()) {
        let custom_handle = custom_handle.trim().to_lowercase();

        if let Err(msg) = validate_handle(&custom_handle) {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": msg})),
            )
                .into_response();
        }

        // Custom handles are gated: prior eligibility or a valid VIP code
        let vip_code = body.get("vipCode").and_then(|v| v.as_str());
        let vip_ok = vip_code
            .map(|c| state.config.vip_codes.iter().any(|v| v == c))
            .unwrap_or(false);

        if row.link_share_eligible == 0 && !vip_ok {
            return (
                StatusCode::FORBIDDEN,
                Json(serde_json::json!({"error": "Not eligible for a custom handle"})),
            )
                .into_response();
        }

        let taken = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE (handle = ? OR custom_handle = ?) AND id != ?",
        )
        .bind(&custom_handle)
        .bind(&custom_handle)
        .bind(&user.id)
        .fetch_one(&state.db)
        .await
        .unwrap_or(0);

        if taken > 0 {
            return (
                StatusCode::CONFLICT,
                Json(serde_json::json!({"error": "Handle already taken"})),
            )
                .into_response();
        }

        let result = sqlx::query(
            "UPDATE users SET custom_handle = ?, link_share_eligible = 1, vip_code_used = COALESCE(?, vip_code_used) WHERE id = ?",
        )
        .bind(&custom_handle)
        .bind(vip_code)
        .bind(&user.id)
        .execute(&state.db)
        .await;

        if let Err(e) = result {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": format!("Failed to update handle: {}", e)})),
            )
                .into_response();
        }
        updated_any = true;
    }

    if !updated_any {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "No fields to update"})),
        )
            .into_response();
    }

    let updated = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(&user.id)
        .fetch_one(&state.db)
        .await;

    match updated {
        Ok(u) => {
            let mut profile = profile_json(&u);
            profile["email"] = serde_json::json!(u.email);
            profile["crystalBalance"] = serde_json::json!(u.crystal_balance);
            Json(profile).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("Failed to load user: {}", e)})),
        )
            .into_response(),
    }
}

/// GET /api/users/:handle
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(handle): Path<String>,
) -> impl IntoResponse {
    let user = match find_user_by_handle(&state.db, &handle).await {
        Some(u) => u,
        None => {
            return (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"error": "User not found"})),
            )
                .into_response()
        }
    };

    let chirp_count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM chirps WHERE author_id = ? AND reply_to_id IS NULL",
    )
    .bind(&user.id)
    .fetch_one(&state.db)
    .await
    .unwrap_or(0);

    let followers = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM follows WHERE following_id = ?",
    )
    .bind(&user.id)
    .fetch_one(&state.db)
    .await
    .unwrap_or(0);

    let following = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM follows WHERE follower_id = ?",
    )
    .bind(&user.id)
    .fetch_one(&state.db)
    .await
    .unwrap_or(0);

    let showcase = sqlx::query_as::<_, CollectedCard>(
        r#"SELECT cc.card_id, pc.name, pc.rarity, pc.image_url, cc.quantity, cc.showcased, cc.obtained_at
           FROM card_collections cc
           JOIN profile_cards pc ON pc.id = cc.card_id
           WHERE cc.user_id = ? AND cc.showcased = 1
           ORDER BY cc.obtained_at DESC"#,
    )
    .bind(&user.id)
    .fetch_all(&state.db)
    .await
    .unwrap_or_default();

    let mut profile = profile_json(&user);
    profile["chirpCount"] = serde_json::json!(chirp_count);
    profile["followers"] = serde_json::json!(followers);
    profile["following"] = serde_json::json!(following);
    profile["showcase"] = serde_json::json!(showcase);

    Json(profile).into_response()
}

/// GET /api/users/:handle/chirps
pub async fn list_user_chirps(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(handle): Path<String>,
    Query(query): Query<FeedQuery>,
) -> impl IntoResponse {
    let user = match find_user_by_handle(&state.db, &handle).await {
        Some(u) => u,
        None => {
            return (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"error": "User not found"})),
            )
                .into_response()
        }
    };

    let limit = query
        .limit
        .unwrap_or(FEED_PAGE_SIZE)
        .clamp(1, MAX_FEED_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0).max(0);

    let rows = sqlx::query_as::<_, Chirp>(
        "SELECT * FROM chirps WHERE author_id = ? AND reply_to_id IS NULL ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
    )
    .bind(&user.id)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.db)
    .await
    .unwrap_or_default();

    let has_more = rows.len() as i64 == limit;
    let viewer_id = viewer.as_ref().map(|u| u.id.as_str());
    let items = feed::assemble_chirps(&state.db, viewer_id, rows).await;

    Json(FeedPage { items, has_more }).into_response()
}
