use std::collections::HashMap;

use chirp_server::feed::assembler::{assemble_views, Aggregates};
use chirp_server::models::{AuthorRow, Chirp};

fn chirp(id: &str, author_id: &str) -> Chirp {
    Chirp {
        id: id.to_string(),
        author_id: author_id.to_string(),
        content: format!("content {}", id),
        reply_to_id: None,
        thread_id: None,
        thread_order: None,
        is_thread_starter: 0,
        repost_of_id: None,
        image_url: None,
        image_alt: None,
        image_width: None,
        image_height: None,
        created_at: "2024-01-01T00:00:00Z".into(),
    }
}

fn author(id: &str, handle: &str, first_name: Option<&str>) -> AuthorRow {
    AuthorRow {
        id: id.to_string(),
        handle: handle.to_string(),
        custom_handle: None,
        first_name: first_name.map(|s| s.to_string()),
        last_name: None,
        profile_image_url: None,
    }
}

#[test]
fn input_order_is_preserved() {
    let rows = vec![chirp("c1", "u1"), chirp("c2", "u1"), chirp("c3", "u1")];
    let authors = HashMap::from([("u1".to_string(), author("u1", "alice", Some("Alice")))]);

    let views = assemble_views(rows, &authors, &Aggregates::default());

    let ids: Vec<&str> = views.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, vec!["c1", "c2", "c3"]);
}

#[test]
fn aggregates_fold_into_views() {
    let rows = vec![chirp("c1", "u1"), chirp("c2", "u1")];
    let authors = HashMap::from([("u1".to_string(), author("u1", "alice", Some("Alice")))]);
    let agg = Aggregates {
        reaction_counts: HashMap::from([("c1".to_string(), 3)]),
        reply_counts: HashMap::from([("c1".to_string(), 1)]),
        liked: ["c1".to_string()].into_iter().collect(),
    };

    let views = assemble_views(rows, &authors, &agg);

    assert_eq!(views[0].reaction_count, 3);
    assert_eq!(views[0].reply_count, 1);
    assert!(views[0].liked_by_viewer);

    // Missing keys read as zero / not-liked
    assert_eq!(views[1].reaction_count, 0);
    assert_eq!(views[1].reply_count, 0);
    assert!(!views[1].liked_by_viewer);
}

#[test]
fn missing_first_name_defaults_to_user() {
    let rows = vec![chirp("c1", "u1")];
    let authors = HashMap::from([("u1".to_string(), author("u1", "alice", None))]);

    let views = assemble_views(rows, &authors, &Aggregates::default());

    assert_eq!(views[0].author.first_name, "User");
    assert_eq!(views[0].author.handle, "alice");
}

#[test]
fn missing_author_row_gets_placeholder() {
    let rows = vec![chirp("c1", "gone")];
    let authors = HashMap::new();

    let views = assemble_views(rows, &authors, &Aggregates::default());

    assert_eq!(views[0].author.id, "gone");
    assert_eq!(views[0].author.handle, "user");
    assert_eq!(views[0].author.first_name, "User");
}

#[test]
fn custom_handle_wins_over_generated() {
    let rows = vec![chirp("c1", "u1")];
    let mut row = author("u1", "user_abc12345", Some("Alice"));
    row.custom_handle = Some("alicebird".into());
    let authors = HashMap::from([("u1".to_string(), row)]);

    let views = assemble_views(rows, &authors, &Aggregates::default());

    assert_eq!(views[0].author.handle, "alicebird");
}

#[test]
fn thread_flags_come_from_row_metadata() {
    let mut starter = chirp("c1", "u1");
    starter.thread_id = Some("c1".into());
    starter.thread_order = Some(0);
    starter.is_thread_starter = 1;

    let mut continuation = chirp("c2", "u1");
    continuation.thread_id = Some("c1".into());
    continuation.thread_order = Some(1);

    let plain = chirp("c3", "u1");

    let authors = HashMap::from([("u1".to_string(), author("u1", "alice", Some("Alice")))]);
    let views = assemble_views(vec![starter, continuation, plain], &authors, &Aggregates::default());

    assert!(views[0].is_thread_starter);
    assert!(!views[0].is_threaded_reply);

    assert!(!views[1].is_thread_starter);
    assert!(views[1].is_threaded_reply);

    assert!(!views[2].is_thread_starter);
    assert!(!views[2].is_threaded_reply);
}
