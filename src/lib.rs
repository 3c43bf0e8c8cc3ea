//! notemark: a personal notes-and-bookmarks server.
//!
//! Authenticated users create, search, tag, and favorite short text notes and
//! URL bookmarks through a JSON API. Layers, leaf to root:
//!
//! - [`fetcher`]: best-effort HTML metadata scraping for bookmarks.
//! - [`db`]: the SQLite-backed resource store.
//! - [`services`]: ownership, validation, and query filtering per resource.
//! - [`api`]: routing, the bearer-token gate, and the uniform response
//!   envelope.
//!
//! Everything stateful is constructed in `main` and passed down through
//! [`AppState`]; there are no ambient singletons.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod services;

use auth::TokenCodec;
use config::AppConfig;
use db::Database;
use fetcher::MetadataFetcher;
use services::{AuthService, BookmarkService, NoteService};

/// Shared handler state: one cheap-to-clone service per resource.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub notes: NoteService,
    pub bookmarks: BookmarkService,
}

impl AppState {
    pub fn new(db: Database, config: &AppConfig) -> Self {
        let tokens = TokenCodec::new(config.token_secret.as_bytes(), config.token_ttl);
        AppState {
            auth: AuthService::new(db.clone(), tokens),
            notes: NoteService::new(db.clone()),
            bookmarks: BookmarkService::new(db, MetadataFetcher::new()),
        }
    }
}
