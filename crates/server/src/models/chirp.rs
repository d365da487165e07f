use serde::{Deserialize, Serialize};

/// Raw chirp row as stored. Boolean columns are SQLite integers.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Chirp {
    pub id: String,
    pub author_id: String,
    pub content: String,
    pub reply_to_id: Option<String>,
    pub thread_id: Option<String>,
    pub thread_order: Option<i64>,
    pub is_thread_starter: i64,
    pub repost_of_id: Option<String>,
    pub image_url: Option<String>,
    pub image_alt: Option<String>,
    pub image_width: Option<i64>,
    pub image_height: Option<i64>,
    pub created_at: String,
}

/// Author columns joined into feed views.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AuthorRow {
    pub id: String,
    pub handle: String,
    pub custom_handle: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorView {
    pub id: String,
    pub handle: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChirpImage {
    pub url: String,
    pub alt: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
}

/// Denormalized chirp as the client renders it: author joined in, aggregate
/// counts folded in, thread classification taken from the row metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChirpView {
    pub id: String,
    pub content: String,
    pub author: AuthorView,
    pub reply_to_id: Option<String>,
    pub thread_id: Option<String>,
    pub thread_order: Option<i64>,
    pub is_thread_starter: bool,
    pub is_threaded_reply: bool,
    pub repost_of_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ChirpImage>,
    pub reaction_count: i64,
    pub reply_count: i64,
    pub liked_by_viewer: bool,
    pub created_at: String,
}

/// Page envelope shared by all paginated feed endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub items: Vec<ChirpView>,
    pub has_more: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChirpRequest {
    pub content: String,
    #[serde(default)]
    pub reply_to_id: Option<String>,
    #[serde(default)]
    pub thread_id: Option<String>,
    /// Start a new thread with this chirp as its starter.
    #[serde(default)]
    pub start_thread: bool,
    #[serde(default)]
    pub repost_of_id: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_alt: Option<String>,
    #[serde(default)]
    pub image_width: Option<i64>,
    #[serde(default)]
    pub image_height: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub kind: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
