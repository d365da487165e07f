pub mod config;
pub mod db;
pub mod feed;
pub mod gacha;
pub mod middleware;
pub mod models;
pub mod routes;

use config::Config;
use feed::cache::FeedCache;

pub struct AppState {
    pub db: sqlx::SqlitePool,
    pub config: Config,
    pub feed_cache: FeedCache,
}
