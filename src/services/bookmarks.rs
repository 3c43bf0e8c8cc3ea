use regex::Regex;
use uuid::Uuid;

use crate::db::Database;
use crate::error::{ApiError, FieldError};
use crate::fetcher::MetadataFetcher;
use crate::models::{
    Bookmark, CreateBookmarkInput, PageMetadata, ResourceFilter, UpdateBookmarkInput,
    BOOKMARK_DESCRIPTION_MAX, BOOKMARK_TITLE_MAX,
};

use super::normalize_tags;

#[derive(Clone)]
pub struct BookmarkService {
    db: Database,
    fetcher: MetadataFetcher,
}

impl BookmarkService {
    pub fn new(db: Database, fetcher: MetadataFetcher) -> Self {
        BookmarkService { db, fetcher }
    }

    /// All of the owner's bookmarks passing the filter, newest change first.
    pub fn list(&self, owner: Uuid, filter: &ResourceFilter) -> Result<Vec<Bookmark>, ApiError> {
        Ok(self.db.list_bookmarks(owner, filter)?)
    }

    pub fn get(&self, owner: Uuid, id: Uuid) -> Result<Bookmark, ApiError> {
        self.authorize(owner, id)
    }

    /// Create a bookmark, filling a blank title/description from the remote
    /// page. Fetch failures are absorbed: the title falls back to the raw URL
    /// and the description stays empty.
    pub async fn create(
        &self,
        owner: Uuid,
        mut input: CreateBookmarkInput,
    ) -> Result<Bookmark, ApiError> {
        input.url = input.url.trim().to_string();

        let mut errors = Vec::new();
        check_url(&input.url, &mut errors);
        check_title(&input.title, &mut errors);
        check_description(&input.description, &mut errors);
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        input.tags = normalize_tags(input.tags);

        if input.title.trim().is_empty() {
            input.title = self
                .fetcher
                .fetch_title(&input.url)
                .await
                .unwrap_or_else(|| input.url.clone());
        }
        if input.description.trim().is_empty() {
            input.description = self
                .fetcher
                .fetch_description(&input.url)
                .await
                .unwrap_or_default();
        }

        Ok(self.db.create_bookmark(owner, input)?)
    }

    /// Partial update: absent fields keep their stored value and are not
    /// revalidated. Metadata is never re-fetched, even when title or
    /// description become blank.
    pub fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        mut input: UpdateBookmarkInput,
    ) -> Result<Bookmark, ApiError> {
        self.authorize(owner, id)?;

        input.url = input.url.map(|u| u.trim().to_string());
        let mut errors = Vec::new();
        if let Some(ref url) = input.url {
            check_url(url, &mut errors);
        }
        if let Some(ref title) = input.title {
            check_title(title, &mut errors);
        }
        if let Some(ref description) = input.description {
            check_description(description, &mut errors);
        }
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }
        input.tags = input.tags.map(normalize_tags);

        self.db.update_bookmark(id, input)?.ok_or_else(not_found)
    }

    pub fn delete(&self, owner: Uuid, id: Uuid) -> Result<(), ApiError> {
        self.authorize(owner, id)?;
        if self.db.delete_bookmark(id)? {
            Ok(())
        } else {
            Err(not_found())
        }
    }

    /// Flip `is_favorite` from the current stored value.
    pub fn toggle_favorite(&self, owner: Uuid, id: Uuid) -> Result<Bookmark, ApiError> {
        let existing = self.authorize(owner, id)?;
        self.db
            .set_bookmark_favorite(id, !existing.is_favorite)?
            .ok_or_else(not_found)
    }

    /// Probe a URL for title/description without persisting anything.
    /// Unreachable pages yield empty fields, not an error.
    pub async fn fetch_metadata(&self, url: &str) -> Result<PageMetadata, ApiError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ApiError::validation("url", "Please provide a URL"));
        }

        Ok(PageMetadata {
            title: self.fetcher.fetch_title(url).await.unwrap_or_default(),
            description: self
                .fetcher
                .fetch_description(url)
                .await
                .unwrap_or_default(),
        })
    }

    /// Existence first, then ownership: a missing id is NotFound for
    /// everyone, a foreign id is Forbidden.
    fn authorize(&self, owner: Uuid, id: Uuid) -> Result<Bookmark, ApiError> {
        let bookmark = self.db.get_bookmark(id)?.ok_or_else(not_found)?;
        if bookmark.owner != owner {
            return Err(ApiError::Forbidden(
                "Not authorized to access this bookmark".to_string(),
            ));
        }
        Ok(bookmark)
    }
}

fn check_url(url: &str, errors: &mut Vec<FieldError>) {
    if url.is_empty() {
        errors.push(FieldError::new("url", "URL is required"));
    } else if !is_valid_url(url) {
        errors.push(FieldError::new("url", "Please provide a valid URL"));
    }
}

fn check_title(title: &str, errors: &mut Vec<FieldError>) {
    if title.chars().count() > BOOKMARK_TITLE_MAX {
        errors.push(FieldError::new(
            "title",
            format!("Title cannot be more than {BOOKMARK_TITLE_MAX} characters"),
        ));
    }
}

fn check_description(description: &str, errors: &mut Vec<FieldError>) {
    if description.chars().count() > BOOKMARK_DESCRIPTION_MAX {
        errors.push(FieldError::new(
            "description",
            format!("Description cannot be more than {BOOKMARK_DESCRIPTION_MAX} characters"),
        ));
    }
}

/// Permissive URL shape: optional scheme, dotted host with a 2-6 letter TLD,
/// then an unanchored path. Deliberately loose; the real test of a URL is
/// whether the fetcher can reach it.
fn is_valid_url(url: &str) -> bool {
    Regex::new(r"^(?i)(https?://)?([\da-z.-]+)\.([a-z.]{2,6})([/\w .-]*)/?$")
        .unwrap()
        .is_match(url)
}

fn not_found() -> ApiError {
    ApiError::NotFound("Bookmark not found".to_string())
}
