pub mod auth;
pub mod chirps;
pub mod crystals;
pub mod follows;
pub mod gacha;
pub mod notifications;
pub mod reactions;
pub mod users;

use crate::AppState;
use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use std::sync::Arc;

pub fn build_router(state: Arc<AppState>) -> Router {
    let auth_routes = Router::new()
        .route("/sign-up", post(auth::sign_up))
        .route("/sign-in", post(auth::sign_in))
        .route("/sign-out", post(auth::sign_out))
        .route("/session", get(auth::get_session));

    let api_routes = Router::new()
        // Chirps
        .route("/chirps", post(chirps::create_chirp))
        .route("/chirps", get(chirps::get_feed))
        .route("/chirps/{chirpId}", get(chirps::get_chirp))
        .route("/chirps/{chirpId}", delete(chirps::delete_chirp))
        .route("/chirps/{chirpId}/replies", get(chirps::list_replies))
        // Reactions
        .route("/chirps/{chirpId}/reactions", post(reactions::react))
        .route("/chirps/{chirpId}/reactions", delete(reactions::unreact))
        // Follows and blocks
        .route("/follows", post(follows::follow))
        .route("/follows/{userId}", delete(follows::unfollow))
        .route("/users/{userId}/follow-stats", get(follows::follow_stats))
        .route("/blocks", post(follows::block))
        .route("/blocks/{userId}", delete(follows::unblock))
        // Notifications
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/{notificationId}/read", patch(notifications::mark_read))
        .route("/notifications/read-all", post(notifications::mark_all_read))
        // Users
        .route("/users/me", get(users::get_me))
        .route("/users/me", patch(users::update_me))
        .route("/users/{handle}", get(users::get_profile))
        .route("/users/{handle}/chirps", get(users::list_user_chirps))
        // Gacha
        .route("/gacha/open", post(gacha::open_capsule))
        .route("/gacha/collection", get(gacha::list_collection))
        .route("/gacha/showcase", put(gacha::update_showcase))
        // Crystals
        .route("/crystals", get(crystals::get_crystals));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api", api_routes)
        .with_state(state)
}
