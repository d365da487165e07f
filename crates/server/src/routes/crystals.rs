use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;

use crate::models::AuthUser;
use crate::AppState;

/// Credit crystals to a user and ledger the change. Engagement rewards are
/// best-effort: failures are logged, never surfaced to the triggering user.
pub(crate) async fn award_crystals(
    db: &sqlx::SqlitePool,
    user_id: &str,
    amount: i64,
    reason: &str,
) {
    let result = sqlx::query("UPDATE users SET crystal_balance = crystal_balance + ? WHERE id = ?")
        .bind(amount)
        .bind(user_id)
        .execute(db)
        .await;

    if let Err(e) = result {
        tracing::warn!("failed to award crystals for {}: {}", reason, e);
        return;
    }

    let now = chrono::Utc::now().to_rfc3339();
    let _ = sqlx::query(
        "INSERT INTO crystal_ledger (id, user_id, amount, reason, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(amount)
    .bind(reason)
    .bind(&now)
    .execute(db)
    .await;
}

/// GET /api/crystals
pub async fn get_crystals(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> impl IntoResponse {
    let balance = sqlx::query_scalar::<_, i64>("SELECT crystal_balance FROM users WHERE id = ?")
        .bind(&user.id)
        .fetch_one(&state.db)
        .await
        .unwrap_or(0);

    let history = sqlx::query_as::<_, (String, i64, String, String)>(
        "SELECT id, amount, reason, created_at FROM crystal_ledger WHERE user_id = ? ORDER BY created_at DESC LIMIT 50",
    )
    .bind(&user.id)
    .fetch_all(&state.db)
    .await
    .unwrap_or_default();

    let entries: Vec<serde_json::Value> = history
        .into_iter()
        .map(|(id, amount, reason, created_at)| {
            serde_json::json!({
                "id": id,
                "amount": amount,
                "reason": reason,
                "createdAt": created_at,
            })
        })
        .collect();

    Json(serde_json::json!({
        "balance": balance,
        "history": entries,
    }))
    .into_response()
}
