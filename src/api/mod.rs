mod handlers;
pub mod middleware;

use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/health", get(handlers::health));

    let protected = Router::new()
        .route("/auth/user", get(handlers::current_user))
        // Notes
        .route("/notes", get(handlers::list_notes))
        .route("/notes", post(handlers::create_note))
        .route("/notes/{id}", get(handlers::get_note))
        .route("/notes/{id}", put(handlers::update_note))
        .route("/notes/{id}", delete(handlers::delete_note))
        .route("/notes/{id}/favorite", put(handlers::toggle_note_favorite))
        // Bookmarks
        .route("/bookmarks", get(handlers::list_bookmarks))
        .route("/bookmarks", post(handlers::create_bookmark))
        .route("/bookmarks/fetch-metadata", post(handlers::fetch_metadata))
        .route("/bookmarks/{id}", get(handlers::get_bookmark))
        .route("/bookmarks/{id}", put(handlers::update_bookmark))
        .route("/bookmarks/{id}", delete(handlers::delete_bookmark))
        .route(
            "/bookmarks/{id}/favorite",
            put(handlers::toggle_bookmark_favorite),
        )
        .route_layer(from_fn_with_state(state.clone(), middleware::require_auth));

    Router::new()
        .nest("/api", public.merge(protected))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
