#![allow(dead_code)]

use axum::Router;
use chirp_server::{config::Config, feed::cache::FeedCache, routes, AppState};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::sync::Arc;

/// Create an in-memory SQLite pool with schema applied.
pub async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory SQLite pool");

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .unwrap();

    // Run schema
    let schema = include_str!("../../src/db/schema.sql");
    for statement in schema.split(';') {
        let trimmed = statement.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(&pool).await.unwrap();
        }
    }

    pool
}

/// Build a test Axum app with the given pool.
pub fn create_test_app(pool: SqlitePool) -> Router {
    let state = Arc::new(AppState {
        db: pool,
        config: Config {
            host: "127.0.0.1".into(),
            port: 0,
            database_path: ":memory:".into(),
            session_ttl_days: 30,
            vip_codes: vec!["vip-test-code".into()],
        },
        feed_cache: FeedCache::new(),
    });

    routes::build_router(state)
}

/// Create a test user directly in the database. Returns (user_id, session_token).
pub async fn create_test_user(pool: &SqlitePool, email: &str, handle: &str) -> (String, String) {
    let user_id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO users (id, handle, email, first_name, crystal_balance, created_at) VALUES (?, ?, ?, ?, 100, ?)",
    )
    .bind(&user_id)
    .bind(handle)
    .bind(email)
    .bind(handle)
    .bind(&now)
    .execute(pool)
    .await
    .unwrap();

    let session_token = uuid::Uuid::new_v4().to_string();
    let expires_at = (chrono::Utc::now() + chrono::Duration::days(30)).to_rfc3339();

    sqlx::query(
        "INSERT INTO sessions (id, user_id, token, expires_at, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(&user_id)
    .bind(&session_token)
    .bind(&expires_at)
    .bind(&now)
    .execute(pool)
    .await
    .unwrap();

    (user_id, session_token)
}

/// Insert a chirp directly, bypassing the API (and therefore the feed cache).
pub async fn create_chirp(
    pool: &SqlitePool,
    author_id: &str,
    content: &str,
    reply_to_id: Option<&str>,
) -> String {
    let chirp_id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO chirps (id, author_id, content, reply_to_id, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&chirp_id)
    .bind(author_id)
    .bind(content)
    .bind(reply_to_id)
    .bind(&now)
    .execute(pool)
    .await
    .unwrap();

    chirp_id
}

/// Insert a chirp with an explicit timestamp, for ordering-sensitive tests.
pub async fn create_chirp_at(
    pool: &SqlitePool,
    author_id: &str,
    content: &str,
    created_at: &str,
) -> String {
    let chirp_id = uuid::Uuid::new_v4().to_string();

    sqlx::query(
        "INSERT INTO chirps (id, author_id, content, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&chirp_id)
    .bind(author_id)
    .bind(content)
    .bind(created_at)
    .execute(pool)
    .await
    .unwrap();

    chirp_id
}

/// Seed a collectible profile card.
pub async fn seed_card(pool: &SqlitePool, subject_id: &str, rarity: &str, name: &str) -> String {
    let card_id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO profile_cards (id, user_id, rarity, name, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&card_id)
    .bind(subject_id)
    .bind(rarity)
    .bind(name)
    .bind(&now)
    .execute(pool)
    .await
    .unwrap();

    card_id
}

/// Overwrite a user's crystal balance.
pub async fn set_crystals(pool: &SqlitePool, user_id: &str, amount: i64) {
    sqlx::query("UPDATE users SET crystal_balance = ? WHERE id = ?")
        .bind(amount)
        .bind(user_id)
        .execute(pool)
        .await
        .unwrap();
}
