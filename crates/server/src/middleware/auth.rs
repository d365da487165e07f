use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::models::{AuthUser, MaybeAuthUser};
use crate::AppState;

fn extract_token(parts: &Parts) -> Option<String> {
    // 1. Session cookie
    let cookie_header = parts
        .headers
        .get("cookie")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let cookie_token = cookie_header
        .split(';')
        .filter_map(|c| {
            let c = c.trim();
            c.strip_prefix("chirp.session_token=")
        })
        .next();

    if let Some(t) = cookie_token {
        if !t.is_empty() {
            return Some(t.to_string());
        }
    }

    // 2. Authorization: Bearer <token>
    parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
}

async fn resolve_user(state: &AppState, token: &str) -> Result<Option<AuthUser>, Response> {
    let row = sqlx::query_as::<_, (String, String, Option<String>, String)>(
        r#"SELECT u.id, u.handle, u.custom_handle, s.expires_at
           FROM sessions s
           JOIN users u ON u.id = s.user_id
           WHERE s.token = ?"#,
    )
    .bind(token)
    .fetch_optional(&state.db)
    .await
    .map_err(|_| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": "Database error"})),
        )
            .into_response()
    })?;

    let (user_id, handle, custom_handle, expires_at) = match row {
        Some(r) => r,
        None => return Ok(None),
    };

    let now = chrono::Utc::now().to_rfc3339();
    if expires_at < now {
        return Ok(None);
    }

    Ok(Some(AuthUser {
        id: user_id,
        handle: custom_handle.unwrap_or(handle),
    }))
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = match extract_token(parts) {
            Some(t) => t,
            None => {
                return Err((
                    StatusCode::UNAUTHORIZED,
                    Json(serde_json::json!({"error": "Not authenticated"})),
                )
                    .into_response())
            }
        };

        match resolve_user(state, &token).await? {
            Some(user) => Ok(user),
            None => Err((
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({"error": "Invalid session"})),
            )
                .into_response()),
        }
    }
}

impl FromRequestParts<Arc<AppState>> for MaybeAuthUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = match extract_token(parts) {
            Some(t) => t,
            None => return Ok(MaybeAuthUser(None)),
        };

        Ok(MaybeAuthUser(resolve_user(state, &token).await?))
    }
}
