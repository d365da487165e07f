use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use argon2::{PasswordHasher, PasswordVerifier};
use chirp_shared::constants::WELCOME_BONUS_CRYSTALS;
use chirp_shared::validation::validate_password;

use crate::models::{AuthUser, MaybeAuthUser, SessionResponse, SessionUser, SignInRequest, SignUpRequest, User};
use crate::AppState;

const HANDLE_ALPHABET: [char; 36] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h',
    'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// Generate a unique auto handle like `user_k3x9q2ma`.
async fn generate_handle(db: &sqlx::SqlitePool) -> Option<String> {
    for _ in 0..5 {
        let candidate = format!("user_{}", nanoid::nanoid!(8, &HANDLE_ALPHABET));
        let taken = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE handle = ? OR custom_handle = ?",
        )
        .bind(&candidate)
        .bind(&candidate)
        .fetch_one(db)
        .await
        .unwrap_or(1);

        if taken == 0 {
            return Some(candidate);
        }
    }
    None
}

async fn create_session(db: &sqlx::SqlitePool, user_id: &str, ttl_days: i64) -> Result<String, sqlx::Error> {
    let token = uuid::Uuid::new_v4().to_string();
    let session_id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();
    let expires_at = (chrono::Utc::now() + chrono::Duration::days(ttl_days)).to_rfc3339();

    sqlx::query(
        "INSERT INTO sessions (id, user_id, token, expires_at, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&session_id)
    .bind(user_id)
    .bind(&token)
    .bind(&expires_at)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(token)
}

fn session_user(user: &User) -> SessionUser {
    SessionUser {
        id: user.id.clone(),
        email: user.email.clone(),
        handle: user.display_handle().to_string(),
        custom_handle: user.custom_handle.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        profile_image_url: user.profile_image_url.clone(),
        crystal_balance: user.crystal_balance,
    }
}

/// POST /api/auth/sign-up
pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SignUpRequest>,
) -> impl IntoResponse {
    let email = body.email.trim().to_lowercase();

    if email.is_empty() || !email.contains('@') {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "A valid email is required"})),
        )
            .into_response();
    }

    if let Err(msg) = validate_password(&body.password) {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": msg})),
        )
            .into_response();
    }

    // Check if email already exists
    let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = ?")
        .bind(&email)
        .fetch_one(&state.db)
        .await
        .unwrap_or(0);

    if exists > 0 {
        return (
            StatusCode::CONFLICT,
            Json(serde_json::json!({"error": "Email already registered"})),
        )
            .into_response();
    }

    let handle = match generate_handle(&state.db).await {
        Some(h) => h,
        None => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Failed to allocate handle"})),
            )
                .into_response()
        }
    };

    // Hash password
    let salt = argon2::password_hash::SaltString::generate(&mut rand::rngs::OsRng);
    let password_hash = match argon2::Argon2::default().hash_password(body.password.as_bytes(), &salt) {
        Ok(h) => h.to_string(),
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Failed to hash password"})),
            )
                .into_response()
        }
    };

    let user_id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    let result = sqlx::query(
        r#"INSERT INTO users (id, handle, email, first_name, last_name, crystal_balance, created_at)
           VALUES (?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(&user_id)
    .bind(&handle)
    .bind(&email)
    .bind(&body.first_name)
    .bind(&body.last_name)
    .bind(WELCOME_BONUS_CRYSTALS)
    .bind(&now)
    .execute(&state.db)
    .await;

    if let Err(e) = result {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("Failed to create user: {}", e)})),
        )
            .into_response();
    }

    let _ = sqlx::query("INSERT INTO credentials (user_id, password_hash) VALUES (?, ?)")
        .bind(&user_id)
        .bind(&password_hash)
        .execute(&state.db)
        .await;

    // Ledger the welcome bonus
    let _ = sqlx::query(
        "INSERT INTO crystal_ledger (id, user_id, amount, reason, created_at) VALUES (?, ?, ?, 'welcome_bonus', ?)",
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(&user_id)
    .bind(WELCOME_BONUS_CRYSTALS)
    .bind(&now)
    .execute(&state.db)
    .await;

    let token = match create_session(&state.db, &user_id, state.config.session_ttl_days).await {
        Ok(t) => t,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": format!("Failed to create session: {}", e)})),
            )
                .into_response()
        }
    };

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(&user_id)
        .fetch_one(&state.db)
        .await;

    match user {
        Ok(user) => (
            StatusCode::CREATED,
            Json(SessionResponse {
                user: session_user(&user),
                token: Some(token),
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("Failed to load user: {}", e)})),
        )
            .into_response(),
    }
}

/// POST /api/auth/sign-in
pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SignInRequest>,
) -> impl IntoResponse {
    let email = body.email.trim().to_lowercase();

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(&state.db)
        .await
        .ok()
        .flatten();

    let user = match user {
        Some(u) => u,
        None => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({"error": "Invalid email or password"})),
            )
                .into_response()
        }
    };

    let stored_hash = sqlx::query_scalar::<_, String>(
        "SELECT password_hash FROM credentials WHERE user_id = ?",
    )
    .bind(&user.id)
    .fetch_optional(&state.db)
    .await
    .ok()
    .flatten();

    let valid = stored_hash
        .as_deref()
        .and_then(|h| argon2::PasswordHash::new(h).ok())
        .map(|parsed| {
            argon2::Argon2::default()
                .verify_password(body.password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false);

    if !valid {
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({"error": "Invalid email or password"})),
        )
            .into_response();
    }

    let token = match create_session(&state.db, &user.id, state.config.session_ttl_days).await {
        Ok(t) => t,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": format!("Failed to create session: {}", e)})),
            )
                .into_response()
        }
    };

    Json(SessionResponse {
        user: session_user(&user),
        token: Some(token),
    })
    .into_response()
}

/// POST /api/auth/sign-out
pub async fn sign_out(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    headers: HeaderMap,
) -> impl IntoResponse {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.to_string())
        .or_else(|| {
            headers
                .get("cookie")
                .and_then(|v| v.to_str().ok())
                .and_then(|c| {
                    c.split(';')
                        .filter_map(|c| c.trim().strip_prefix("chirp.session_token="))
                        .next()
                        .map(|t| t.to_string())
                })
        });

    if let Some(token) = token {
        let _ = sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(&token)
            .execute(&state.db)
            .await;
    }

    Json(serde_json::json!({"signedOut": true})).into_response()
}

/// GET /api/auth/session
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(user): MaybeAuthUser,
) -> impl IntoResponse {
    let user = match user {
        Some(u) => u,
        None => return Json(serde_json::json!({"user": null})).into_response(),
    };

    let row = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(&user.id)
        .fetch_optional(&state.db)
        .await
        .ok()
        .flatten();

    match row {
        Some(u) => Json(SessionResponse {
            user: session_user(&u),
            token: None,
        })
        .into_response(),
        None => Json(serde_json::json!({"user": null})).into_response(),
    }
}
