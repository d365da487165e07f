use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use chirp_shared::constants::{CAPSULE_COST_CRYSTALS, MAX_SHOWCASE_CARDS};

use crate::gacha::draw_rarity;
use crate::models::{AuthUser, CollectedCard, ProfileCard};
use crate::AppState;

/// POST /api/gacha/open
pub async fn open_capsule(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> impl IntoResponse {
    // 1. Check crystal balance
    let balance = sqlx::query_scalar::<_, i64>("SELECT crystal_balance FROM users WHERE id = ?")
        .bind(&user.id)
        .fetch_optional(&state.db)
        .await
        .ok()
        .flatten()
        .unwrap_or(0);

    if balance < CAPSULE_COST_CRYSTALS {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Insufficient crystals"})),
        )
            .into_response();
    }

    // 2. Weighted rarity draw, then a uniform card within that tier. An
    // empty tier pool falls back to a uniform card of any rarity.
    let rarity = {
        let mut rng = rand::thread_rng();
        draw_rarity(&mut rng)
    };

    let mut card = sqlx::query_as::<_, ProfileCard>(
        "SELECT * FROM profile_cards WHERE rarity = ? ORDER BY RANDOM() LIMIT 1",
    )
    .bind(rarity.as_str())
    .fetch_optional(&state.db)
    .await
    .ok()
    .flatten();

    if card.is_none() {
        card = sqlx::query_as::<_, ProfileCard>(
            "SELECT * FROM profile_cards ORDER BY RANDOM() LIMIT 1",
        )
        .fetch_optional(&state.db)
        .await
        .ok()
        .flatten();
    }

    let card = match card {
        Some(c) => c,
        None => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "No cards available"})),
            )
                .into_response()
        }
    };

    // 3. Deduct the capsule cost
    let now = chrono::Utc::now().to_rfc3339();
    let new_balance = balance - CAPSULE_COST_CRYSTALS;

    let result = sqlx::query("UPDATE users SET crystal_balance = ? WHERE id = ?")
        .bind(new_balance)
        .bind(&user.id)
        .execute(&state.db)
        .await;

    if let Err(e) = result {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("Failed to spend crystals: {}", e)})),
        )
            .into_response();
    }

    let _ = sqlx::query(
        "INSERT INTO crystal_ledger (id, user_id, amount, reason, created_at) VALUES (?, ?, ?, 'capsule_opened', ?)",
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(&user.id)
    .bind(-CAPSULE_COST_CRYSTALS)
    .bind(&now)
    .execute(&state.db)
    .await;

    // 4. Add to the collection; duplicate pulls bump the quantity
    let existing_quantity = sqlx::query_scalar::<_, i64>(
        "SELECT quantity FROM card_collections WHERE user_id = ? AND card_id = ?",
    )
    .bind(&user.id)
    .bind(&card.id)
    .fetch_optional(&state.db)
    .await
    .ok()
    .flatten();

    let duplicate = existing_quantity.is_some();

    let _ = sqlx::query(
        r#"INSERT INTO card_collections (user_id, card_id, quantity, showcased, obtained_at)
           VALUES (?, ?, 1, 0, ?)
           ON CONFLICT(user_id, card_id) DO UPDATE SET quantity = quantity + 1"#,
    )
    .bind(&user.id)
    .bind(&card.id)
    .bind(&now)
    .execute(&state.db)
    .await;

    let quantity = existing_quantity.map(|q| q + 1).unwrap_or(1);

    Json(serde_json::json!({
        "cardId": card.id,
        "name": card.name,
        "rarity": card.rarity,
        "imageUrl": card.image_url,
        "subjectUserId": card.user_id,
        "duplicate": duplicate,
        "quantity": quantity,
        "newBalance": new_balance,
    }))
    .into_response()
}

/// GET /api/gacha/collection
pub async fn list_collection(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> impl IntoResponse {
    let cards = sqlx::query_as::<_, CollectedCard>(
        r#"SELECT cc.card_id, pc.name, pc.rarity, pc.image_url, cc.quantity, cc.showcased, cc.obtained_at
           FROM card_collections cc
           JOIN profile_cards pc ON pc.id = cc.card_id
           WHERE cc.user_id = ?
           ORDER BY cc.obtained_at DESC"#,
    )
    .bind(&user.id)
    .fetch_all(&state.db)
    .await
    .unwrap_or_default();

    Json(cards).into_response()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowcaseRequest {
    pub card_ids: Vec<String>,
}

/// PUT /api/gacha/showcase
pub async fn update_showcase(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(body): Json<ShowcaseRequest>,
) -> impl IntoResponse {
    if body.card_ids.len() as i64 > MAX_SHOWCASE_CARDS {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": format!("At most {} cards can be showcased", MAX_SHOWCASE_CARDS)})),
        )
            .into_response();
    }

    // Every card must be owned
    for card_id in &body.card_ids {
        let owned = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM card_collections WHERE user_id = ? AND card_id = ?",
        )
        .bind(&user.id)
        .bind(card_id)
        .fetch_one(&state.db)
        .await
        .unwrap_or(0);

        if owned == 0 {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": "Card not in collection"})),
            )
                .into_response();
        }
    }

    let result = sqlx::query("UPDATE card_collections SET showcased = 0 WHERE user_id = ?")
        .bind(&user.id)
        .execute(&state.db)
        .await;

    if let Err(e) = result {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("Failed to update showcase: {}", e)})),
        )
            .into_response();
    }

    for card_id in &body.card_ids {
        let _ = sqlx::query(
            "UPDATE card_collections SET showcased = 1 WHERE user_id = ? AND card_id = ?",
        )
        .bind(&user.id)
        .bind(card_id)
        .execute(&state.db)
        .await;
    }

    // Showcase appears on profiles rendered from cached feed data
    state.feed_cache.clear().await;

    Json(serde_json::json!({"showcased": body.card_ids})).into_response()
}
