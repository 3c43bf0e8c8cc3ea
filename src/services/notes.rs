use uuid::Uuid;

use crate::db::Database;
use crate::error::{ApiError, FieldError};
use crate::models::{CreateNoteInput, Note, ResourceFilter, UpdateNoteInput, NOTE_TITLE_MAX};

use super::normalize_tags;

#[derive(Clone)]
pub struct NoteService {
    db: Database,
}

impl NoteService {
    pub fn new(db: Database) -> Self {
        NoteService { db }
    }

    /// All of the owner's notes passing the filter, newest change first.
    pub fn list(&self, owner: Uuid, filter: &ResourceFilter) -> Result<Vec<Note>, ApiError> {
        Ok(self.db.list_notes(owner, filter)?)
    }

    pub fn get(&self, owner: Uuid, id: Uuid) -> Result<Note, ApiError> {
        self.authorize(owner, id)
    }

    pub fn create(&self, owner: Uuid, mut input: CreateNoteInput) -> Result<Note, ApiError> {
        input.title = input.title.trim().to_string();

        let mut errors = Vec::new();
        check_title(&input.title, &mut errors);
        check_content(&input.content, &mut errors);
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        input.tags = normalize_tags(input.tags);
        Ok(self.db.create_note(owner, input)?)
    }

    /// Partial update: absent fields keep their stored value and are not
    /// revalidated. `updated_at` is stamped even when every provided value
    /// is unchanged.
    pub fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        mut input: UpdateNoteInput,
    ) -> Result<Note, ApiError> {
        self.authorize(owner, id)?;

        input.title = input.title.map(|t| t.trim().to_string());
        let mut errors = Vec::new();
        if let Some(ref title) = input.title {
            check_title(title, &mut errors);
        }
        if let Some(ref content) = input.content {
            check_content(content, &mut errors);
        }
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }
        input.tags = input.tags.map(normalize_tags);

        self.db.update_note(id, input)?.ok_or_else(not_found)
    }

    pub fn delete(&self, owner: Uuid, id: Uuid) -> Result<(), ApiError> {
        self.authorize(owner, id)?;
        if self.db.delete_note(id)? {
            Ok(())
        } else {
            Err(not_found())
        }
    }

    /// Flip `is_favorite` from the current stored value.
    pub fn toggle_favorite(&self, owner: Uuid, id: Uuid) -> Result<Note, ApiError> {
        let existing = self.authorize(owner, id)?;
        self.db
            .set_note_favorite(id, !existing.is_favorite)?
            .ok_or_else(not_found)
    }

    /// Existence first, then ownership: a missing id is NotFound for
    /// everyone, a foreign id is Forbidden.
    fn authorize(&self, owner: Uuid, id: Uuid) -> Result<Note, ApiError> {
        let note = self.db.get_note(id)?.ok_or_else(not_found)?;
        if note.owner != owner {
            return Err(ApiError::Forbidden(
                "Not authorized to access this note".to_string(),
            ));
        }
        Ok(note)
    }
}

fn check_title(title: &str, errors: &mut Vec<FieldError>) {
    if title.is_empty() {
        errors.push(FieldError::new("title", "Title is required"));
    } else if title.chars().count() > NOTE_TITLE_MAX {
        errors.push(FieldError::new(
            "title",
            format!("Title cannot be more than {NOTE_TITLE_MAX} characters"),
        ));
    }
}

fn check_content(content: &str, errors: &mut Vec<FieldError>) {
    if content.is_empty() {
        errors.push(FieldError::new("content", "Content is required"));
    }
}

fn not_found() -> ApiError {
    ApiError::NotFound("Note not found".to_string())
}
