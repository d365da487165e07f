use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use chirp_shared::constants::NOTIFICATION_PAGE_SIZE;

use crate::models::{AuthUser, NotificationActor, NotificationView};
use crate::AppState;

/// Record a notification for `user_id`. Self-notifications are dropped;
/// failures are logged and never bubble into the triggering operation.
pub(crate) async fn create_notification(
    db: &sqlx::SqlitePool,
    user_id: &str,
    kind: &str,
    actor_id: &str,
    chirp_id: Option<&str>,
) {
    if user_id == actor_id {
        return;
    }

    let now = chrono::Utc::now().to_rfc3339();
    let result = sqlx::query(
        "INSERT INTO notifications (id, user_id, type, actor_id, chirp_id, is_read, created_at) VALUES (?, ?, ?, ?, ?, 0, ?)",
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(kind)
    .bind(actor_id)
    .bind(chirp_id)
    .bind(&now)
    .execute(db)
    .await;

    if let Err(e) = result {
        tracing::warn!("failed to create {} notification: {}", kind, e);
    }
}

/// GET /api/notifications
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> impl IntoResponse {
    let rows = sqlx::query_as::<_, (String, String, String, Option<String>, i64, String, String, Option<String>, Option<String>, Option<String>)>(
        r#"SELECT n.id, n.type, n.actor_id, n.chirp_id, n.is_read, n.created_at,
                  u.handle, u.custom_handle, u.first_name, u.profile_image_url
           FROM notifications n
           JOIN users u ON u.id = n.actor_id
           WHERE n.user_id = ?
           ORDER BY n.created_at DESC
           LIMIT ?"#,
    )
    .bind(&user.id)
    .bind(NOTIFICATION_PAGE_SIZE)
    .fetch_all(&state.db)
    .await
    .unwrap_or_default();

    let unread_count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM notifications WHERE user_id = ? AND is_read = 0",
    )
    .bind(&user.id)
    .fetch_one(&state.db)
    .await
    .unwrap_or(0);

    let items: Vec<NotificationView> = rows
        .into_iter()
        .map(
            |(id, kind, actor_id, chirp_id, is_read, created_at, handle, custom_handle, first_name, profile_image_url)| {
                NotificationView {
                    id,
                    kind,
                    actor: NotificationActor {
                        id: actor_id,
                        handle: custom_handle.unwrap_or(handle),
                        first_name: first_name.unwrap_or_else(|| "User".into()),
                        profile_image_url,
                    },
                    chirp_id,
                    read: is_read != 0,
                    created_at,
                }
            },
        )
        .collect();

    Json(serde_json::json!({
        "items": items,
        "unreadCount": unread_count,
    }))
    .into_response()
}

/// PATCH /api/notifications/:notificationId/read
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(notification_id): Path<String>,
) -> impl IntoResponse {
    let result = sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = ? AND user_id = ?")
        .bind(&notification_id)
        .bind(&user.id)
        .execute(&state.db)
        .await;

    match result {
        Ok(r) if r.rows_affected() > 0 => Json(serde_json::json!({"read": true})).into_response(),
        Ok(_) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Notification not found"})),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("Failed to mark as read: {}", e)})),
        )
            .into_response(),
    }
}

/// POST /api/notifications/read-all
pub async fn mark_all_read(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> impl IntoResponse {
    let result = sqlx::query("UPDATE notifications SET is_read = 1 WHERE user_id = ? AND is_read = 0")
        .bind(&user.id)
        .execute(&state.db)
        .await;

    match result {
        Ok(r) => Json(serde_json::json!({"marked": r.rows_affected()})).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("Failed to mark all as read: {}", e)})),
        )
            .into_response(),
    }
}
