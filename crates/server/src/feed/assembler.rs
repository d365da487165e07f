use std::collections::{HashMap, HashSet};

use crate::models::{AuthorRow, AuthorView, Chirp, ChirpImage, ChirpView};

/// The per-page lookups the aggregate fetchers produce. Missing keys read as
/// zero / not-liked.
#[derive(Debug, Default)]
pub struct Aggregates {
    pub reaction_counts: HashMap<String, i64>,
    pub reply_counts: HashMap<String, i64>,
    pub liked: HashSet<String>,
}

fn author_view(author_id: &str, authors: &HashMap<String, AuthorRow>) -> AuthorView {
    match authors.get(author_id) {
        Some(row) => AuthorView {
            id: row.id.clone(),
            handle: row
                .custom_handle
                .clone()
                .unwrap_or_else(|| row.handle.clone()),
            first_name: row.first_name.clone().unwrap_or_else(|| "User".into()),
            last_name: row.last_name.clone(),
            profile_image_url: row.profile_image_url.clone(),
        },
        // Author row missing (deleted account, lookup degraded): placeholder
        None => AuthorView {
            id: author_id.to_string(),
            handle: "user".into(),
            first_name: "User".into(),
            last_name: None,
            profile_image_url: None,
        },
    }
}

/// Combine raw rows, author rows and aggregates into the denormalized views
/// the client renders. Input order is preserved; thread classification comes
/// from the row metadata, never re-derived.
pub fn assemble_views(
    rows: Vec<Chirp>,
    authors: &HashMap<String, AuthorRow>,
    agg: &Aggregates,
) -> Vec<ChirpView> {
    rows.into_iter()
        .map(|chirp| {
            let author = author_view(&chirp.author_id, authors);
            let is_thread_starter = chirp.is_thread_starter != 0;
            let is_threaded_reply = chirp.thread_id.is_some() && !is_thread_starter;
            let image = chirp.image_url.map(|url| ChirpImage {
                url,
                alt: chirp.image_alt,
                width: chirp.image_width,
                height: chirp.image_height,
            });

            ChirpView {
                reaction_count: agg.reaction_counts.get(&chirp.id).copied().unwrap_or(0),
                reply_count: agg.reply_counts.get(&chirp.id).copied().unwrap_or(0),
                liked_by_viewer: agg.liked.contains(&chirp.id),
                id: chirp.id,
                content: chirp.content,
                author,
                reply_to_id: chirp.reply_to_id,
                thread_id: chirp.thread_id,
                thread_order: chirp.thread_order,
                is_thread_starter,
                is_threaded_reply,
                repost_of_id: chirp.repost_of_id,
                image,
                created_at: chirp.created_at,
            }
        })
        .collect()
}
