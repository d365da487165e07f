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
async fn get_me_includes_private_fields() {
    let (server, pool) = setup().await;
    let (user_id, token) = common::create_test_user(&pool, "alice@test.com", "alice").await;

    let (h, v) = auth_header(&token);
    let res = server.get("/api/users/me").add_header(h, v).await;

    res.assert_status_ok();
    let body: serde_json::Value = res.json();
    assert_eq!(body["id"], user_id);
    assert_eq!(body["email"], "alice@test.com");
    assert_eq!(body["crystalBalance"], 100);
    assert_eq!(body["linkShareEligible"], false);
}

#[tokio::test]
async fn update_bio_and_name() {
    let (server, pool) = setup().await;
    let (_, token) = common::create_test_user(&pool, "alice@test.com", "alice").await;

    let (h, v) = auth_header(&token);
    let res = server
        .patch("/api/users/me")
        .add_header(h, v)
        .json(&json!({"bio": "rust and birds", "firstName": "Alicia"}))
        .await;

    res.assert_status_ok();
    let body: serde_json::Value = res.json();
    assert_eq!(body["bio"], "rust and birds");
    assert_eq!(body["firstName"], "Alicia");
}

#[tokio::test]
async fn overlong_bio_rejected() {
    let (server, pool) = setup().await;
    let (_, token) = common::create_test_user(&pool, "alice@test.com", "alice").await;

    let (h, v) = auth_header(&token);
    let res = server
        .patch("/api/users/me")
        .add_header(h, v)
        .json(&json!({"bio": "x".repeat(161)}))
        .await;

    res.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_update_rejected() {
    let (server, pool) = setup().await;
    let (_, token) = common::create_test_user(&pool, "alice@test.com", "alice").await;

    let (h, v) = auth_header(&token);
    let res = server
        .patch("/api/users/me")
        .add_header(h, v)
        .json(&json!({}))
        .await;

    res.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json();
    assert_eq!(body["error"], "No fields to update");
}

#[tokio::test]
async fn custom_handle_requires_eligibility() {
    let (server, pool) = setup().await;
    let (_, token) = common::create_test_user(&pool, "alice@test.com", "alice").await;

    let (h, v) = auth_header(&token);
    let res = server
        .patch("/api/users/me")
        .add_header(h, v)
        .json(&json!({"customHandle": "alicebird"}))
        .await;

    res.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn vip_code_unlocks_custom_handle() {
    let (server, pool) = setup().await;
    let (_, token) = common::create_test_user(&pool, "alice@test.com", "alice").await;

    let (h, v) = auth_header(&token);
    let res = server
        .patch("/api/users/me")
        .add_header(h, v)
        .json(&json!({"customHandle": "AliceBird", "vipCode": "vip-test-code"}))
        .await;

    res.assert_status_ok();
    let body: serde_json::Value = res.json();
    // Handles are normalized to lowercase
    assert_eq!(body["customHandle"], "alicebird");
    assert_eq!(body["handle"], "alicebird");

    // Eligibility persists, so a second change needs no code
    let (h, v) = auth_header(&token);
    let res = server
        .patch("/api/users/me")
        .add_header(h, v)
        .json(&json!({"customHandle": "alice_two"}))
        .await;
    res.assert_status_ok();
}

#[tokio::test]
async fn bad_vip_code_stays_forbidden() {
    let (server, pool) = setup().await;
    let (_, token) = common::create_test_user(&pool, "alice@test.com", "alice").await;

    let (h, v) = auth_header(&token);
    let res = server
        .patch("/api/users/me")
        .add_header(h, v)
        .json(&json!({"customHandle": "alicebird", "vipCode": "nope"}))
        .await;

    res.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn custom_handle_conflict_is_409() {
    let (server, pool) = setup().await;
    let (_, alice_token) = common::create_test_user(&pool, "alice@test.com", "alice").await;
    let (_, _) = common::create_test_user(&pool, "bob@test.com", "bob").await;

    let (h, v) = auth_header(&alice_token);
    let res = server
        .patch("/api/users/me")
        .add_header(h, v)
        .json(&json!({"customHandle": "bob", "vipCode": "vip-test-code"}))
        .await;

    res.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn invalid_custom_handle_rejected() {
    let (server, pool) = setup().await;
    let (_, token) = common::create_test_user(&pool, "alice@test.com", "alice").await;

    for bad in ["ab", "has space", "has-dash", &"x".repeat(25)] {
        let (h, v) = auth_header(&token);
        let res = server
            .patch("/api/users/me")
            .add_header(h, v)
            .json(&json!({"customHandle": bad, "vipCode": "vip-test-code"}))
            .await;
        res.assert_status(StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn profile_resolves_custom_handle_and_counts() {
    let (server, pool) = setup().await;
    let (alice_id, alice_token) = common::create_test_user(&pool, "alice@test.com", "alice").await;
    let (_, bob_token) = common::create_test_user(&pool, "bob@test.com", "bob").await;

    common::create_chirp(&pool, &alice_id, "top level", None).await;
    let parent = common::create_chirp(&pool, &alice_id, "another", None).await;
    // Replies don't count toward chirpCount
    common::create_chirp(&pool, &alice_id, "a reply", Some(&parent)).await;

    let (h, v) = auth_header(&bob_token);
    server
        .post("/api/follows")
        .add_header(h, v)
        .json(&json!({"userId": alice_id}))
        .await;

    let (h, v) = auth_header(&alice_token);
    server
        .patch("/api/users/me")
        .add_header(h, v)
        .json(&json!({"customHandle": "alicebird", "vipCode": "vip-test-code"}))
        .await;

    // Both the original and the custom handle resolve
    for handle in ["alice", "alicebird"] {
        let res = server.get(&format!("/api/users/{}", handle)).await;
        res.assert_status_ok();
        let body: serde_json::Value = res.json();
        assert_eq!(body["id"], alice_id);
        assert_eq!(body["handle"], "alicebird");
        assert_eq!(body["chirpCount"], 2);
        assert_eq!(body["followers"], 1);
        assert_eq!(body["following"], 0);
    }
}

#[tokio::test]
async fn missing_profile_is_404() {
    let (server, _pool) = setup().await;

    let res = server.get("/api/users/nobody").await;
    res.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn user_chirps_lists_top_level_only() {
    let (server, pool) = setup().await;
    let (alice_id, _) = common::create_test_user(&pool, "alice@test.com", "alice").await;
    let (bob_id, _) = common::create_test_user(&pool, "bob@test.com", "bob").await;

    let own = common::create_chirp_at(&pool, &alice_id, "alice chirp", "2024-01-01T00:00:01Z").await;
    common::create_chirp_at(&pool, &bob_id, "bob chirp", "2024-01-01T00:00:02Z").await;
    common::create_chirp(&pool, &alice_id, "alice reply", Some(&own)).await;

    let res = server.get("/api/users/alice/chirps").await;
    res.assert_status_ok();
    let body: serde_json::Value = res.json();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["content"], "alice chirp");
    assert_eq!(body["hasMore"], false);
}
