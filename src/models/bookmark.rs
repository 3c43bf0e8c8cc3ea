use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum accepted bookmark title length.
pub const BOOKMARK_TITLE_MAX: usize = 200;
/// Maximum accepted bookmark description length.
pub const BOOKMARK_DESCRIPTION_MAX: usize = 1000;

/// A saved URL.
///
/// Same ownership and tag semantics as [`Note`](super::Note). Title and
/// description are optional; when blank at creation time they are filled from
/// the remote page where reachable, with the raw URL as the title fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: Uuid,
    pub owner: Uuid,
    pub url: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a bookmark.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookmarkInput {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
}

/// Input for updating a bookmark. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookmarkInput {
    pub url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_favorite: Option<bool>,
}

/// Title/description pair returned by the metadata probe endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
}
