mod common;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::json;

fn auth_header(token: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("authorization"),
        format!("Bearer {}", token).parse().unwrap(),
    )
}

async fn setup() -> (TestServer, sqlx::SqlitePool) {
    let pool = common::setup_test_db().await;
    let app = common::create_test_app(pool.clone());
    let server = TestServer::new(app).unwrap();
    (server, pool)
}

#[tokio::test]
async fn reply_notifies_parent_author() {
    let (server, pool) = setup().await;
    let (alice_id, alice_token) = common::create_test_user(&pool, "alice@test.com", "alice").await;
    let (bob_id, bob_token) = common::create_test_user(&pool, "bob@test.com", "bob").await;

    let parent_id = common::create_chirp(&pool, &alice_id, "parent", None).await;

    let (h, v) = auth_header(&bob_token);
    server
        .post("/api/chirps")
        .add_header(h, v)
        .json(&json!({"content": "a reply", "replyToId": parent_id}))
        .await;

    let (h, v) = auth_header(&alice_token);
    let res = server.get("/api/notifications").add_header(h, v).await;
    res.assert_status_ok();
    let body: serde_json::Value = res.json();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["type"], "reply");
    assert_eq!(items[0]["actor"]["id"], bob_id);
    assert_eq!(items[0]["read"], false);
    assert_eq!(body["unreadCount"], 1);
}

#[tokio::test]
async fn mention_notifies_mentioned_user() {
    let (server, pool) = setup().await;
    let (_, alice_token) = common::create_test_user(&pool, "alice@test.com", "alice").await;
    let (_, bob_token) = common::create_test_user(&pool, "bob@test.com", "bob").await;

    let (h, v) = auth_header(&alice_token);
    server
        .post("/api/chirps")
        .add_header(h, v)
        .json(&json!({"content": "hey @bob look at this"}))
        .await;

    let (h, v) = auth_header(&bob_token);
    let res = server.get("/api/notifications").add_header(h, v).await;
    let body: serde_json::Value = res.json();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["type"], "mention");
    assert_eq!(items[0]["actor"]["handle"], "alice");
}

#[tokio::test]
async fn self_reply_does_not_notify() {
    let (server, pool) = setup().await;
    let (alice_id, alice_token) = common::create_test_user(&pool, "alice@test.com", "alice").await;

    let parent_id = common::create_chirp(&pool, &alice_id, "my own chirp", None).await;

    let (h, v) = auth_header(&alice_token);
    server
        .post("/api/chirps")
        .add_header(h, v)
        .json(&json!({"content": "replying to myself @alice", "replyToId": parent_id}))
        .await;

    let (h, v) = auth_header(&alice_token);
    let res = server.get("/api/notifications").add_header(h, v).await;
    let body: serde_json::Value = res.json();
    assert_eq!(body["items"].as_array().unwrap().len(), 0);
    assert_eq!(body["unreadCount"], 0);
}

#[tokio::test]
async fn mark_read_flips_single_notification() {
    let (server, pool) = setup().await;
    let (alice_id, alice_token) = common::create_test_user(&pool, "alice@test.com", "alice").await;
    let (_, bob_token) = common::create_test_user(&pool, "bob@test.com", "bob").await;

    let parent_id = common::create_chirp(&pool, &alice_id, "parent", None).await;
    let (h, v) = auth_header(&bob_token);
    server
        .post("/api/chirps")
        .add_header(h, v)
        .json(&json!({"content": "reply one", "replyToId": parent_id}))
        .await;

    let (h, v) = auth_header(&alice_token);
    let res = server.get("/api/notifications").add_header(h, v).await;
    let body: serde_json::Value = res.json();
    let notification_id = body["items"][0]["id"].as_str().unwrap().to_string();

    let (h, v) = auth_header(&alice_token);
    let res = server
        .patch(&format!("/api/notifications/{}/read", notification_id))
        .add_header(h, v)
        .await;
    res.assert_status_ok();

    let (h, v) = auth_header(&alice_token);
    let res = server.get("/api/notifications").add_header(h, v).await;
    let body: serde_json::Value = res.json();
    assert_eq!(body["items"][0]["read"], true);
    assert_eq!(body["unreadCount"], 0);
}

#[tokio::test]
async fn mark_read_rejects_other_users_notification() {
    let (server, pool) = setup().await;
    let (alice_id, alice_token) = common::create_test_user(&pool, "alice@test.com", "alice").await;
    let (_, bob_token) = common::create_test_user(&pool, "bob@test.com", "bob").await;

    let parent_id = common::create_chirp(&pool, &alice_id, "parent", None).await;
    let (h, v) = auth_header(&bob_token);
    server
        .post("/api/chirps")
        .add_header(h, v)
        .json(&json!({"content": "reply", "replyToId": parent_id}))
        .await;

    let (h, v) = auth_header(&alice_token);
    let res = server.get("/api/notifications").add_header(h, v).await;
    let body: serde_json::Value = res.json();
    let notification_id = body["items"][0]["id"].as_str().unwrap().to_string();

    // Bob cannot mark Alice's notification
    let (h, v) = auth_header(&bob_token);
    let res = server
        .patch(&format!("/api/notifications/{}/read", notification_id))
        .add_header(h, v)
        .await;
    res.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn mark_all_read_clears_unread_count() {
    let (server, pool) = setup().await;
    let (alice_id, alice_token) = common::create_test_user(&pool, "alice@test.com", "alice").await;
    let (_, bob_token) = common::create_test_user(&pool, "bob@test.com", "bob").await;

    let parent_id = common::create_chirp(&pool, &alice_id, "parent", None).await;
    for i in 0..3 {
        let (h, v) = auth_header(&bob_token);
        server
            .post("/api/chirps")
            .add_header(h, v)
            .json(&json!({"content": format!("reply {}", i), "replyToId": parent_id}))
            .await;
    }

    let (h, v) = auth_header(&alice_token);
    let res = server.post("/api/notifications/read-all").add_header(h, v).await;
    res.assert_status_ok();
    let body: serde_json::Value = res.json();
    assert_eq!(body["marked"], 3);

    let (h, v) = auth_header(&alice_token);
    let res = server.get("/api/notifications").add_header(h, v).await;
    let body: serde_json::Value = res.json();
    assert_eq!(body["unreadCount"], 0);
}

#[tokio::test]
async fn notifications_require_auth() {
    let (server, _pool) = setup().await;

    let res = server.get("/api/notifications").await;
    res.assert_status(StatusCode::UNAUTHORIZED);
}
