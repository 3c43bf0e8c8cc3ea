mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::Utc;
use rusqlite::{Connection, Row};
use uuid::Uuid;

use crate::models::*;

/// The resource store: one SQLite handle shared behind a mutex.
///
/// Methods here are plain per-document CRUD plus owner-scoped filtered lists;
/// ownership and validation rules live in the services layer.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "notemark")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let db_path = dirs.data_dir().join("notemark.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // User operations
    // ============================================================

    pub fn create_user(&self, input: NewUser) -> Result<User> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO users (id, name, email, password_hash, created_at)
             VALUES (?, ?, ?, ?, ?)",
            (
                id.to_string(),
                &input.name,
                &input.email,
                &input.password_hash,
                now.to_rfc3339(),
            ),
        )?;

        Ok(User {
            id,
            name: input.name,
            email: input.email,
            password_hash: input.password_hash,
            created_at: now,
        })
    }

    pub fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, name, email, password_hash, created_at FROM users WHERE id = ?",
        )?;

        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(user_from_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, name, email, password_hash, created_at FROM users WHERE email = ?",
        )?;

        let mut rows = stmt.query([email])?;
        match rows.next()? {
            Some(row) => Ok(Some(user_from_row(row)?)),
            None => Ok(None),
        }
    }

    // ============================================================
    // Note operations
    // ============================================================

    pub fn list_notes(&self, owner: Uuid, filter: &ResourceFilter) -> Result<Vec<Note>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, owner, title, content, tags, is_favorite, created_at, updated_at
             FROM notes WHERE owner = ? ORDER BY updated_at DESC",
        )?;

        let notes = stmt
            .query_map([owner.to_string()], note_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(notes
            .into_iter()
            .filter(|n| filter.matches(&[&n.title, &n.content], &n.tags, n.is_favorite))
            .collect())
    }

    pub fn get_note(&self, id: Uuid) -> Result<Option<Note>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, owner, title, content, tags, is_favorite, created_at, updated_at
             FROM notes WHERE id = ?",
        )?;

        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(note_from_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn create_note(&self, owner: Uuid, input: CreateNoteInput) -> Result<Note> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO notes (id, owner, title, content, tags, is_favorite, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                owner.to_string(),
                &input.title,
                &input.content,
                serde_json::to_string(&input.tags)?,
                input.is_favorite as i32,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;

        Ok(Note {
            id,
            owner,
            title: input.title,
            content: input.content,
            tags: input.tags,
            is_favorite: input.is_favorite,
            created_at: now,
            updated_at: now,
        })
    }

    /// Merge the provided fields over the stored note and stamp `updated_at`,
    /// even when every value is unchanged.
    pub fn update_note(&self, id: Uuid, input: UpdateNoteInput) -> Result<Option<Note>> {
        let Some(existing) = self.get_note(id)? else {
            return Ok(None);
        };

        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();
        let title = input.title.unwrap_or(existing.title);
        let content = input.content.unwrap_or(existing.content);
        let tags = input.tags.unwrap_or(existing.tags);
        let is_favorite = input.is_favorite.unwrap_or(existing.is_favorite);

        conn.execute(
            "UPDATE notes SET title = ?, content = ?, tags = ?, is_favorite = ?, updated_at = ?
             WHERE id = ?",
            (
                &title,
                &content,
                serde_json::to_string(&tags)?,
                is_favorite as i32,
                now.to_rfc3339(),
                id.to_string(),
            ),
        )?;

        Ok(Some(Note {
            id,
            owner: existing.owner,
            title,
            content,
            tags,
            is_favorite,
            created_at: existing.created_at,
            updated_at: now,
        }))
    }

    pub fn set_note_favorite(&self, id: Uuid, is_favorite: bool) -> Result<Option<Note>> {
        let Some(existing) = self.get_note(id)? else {
            return Ok(None);
        };

        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();

        conn.execute(
            "UPDATE notes SET is_favorite = ?, updated_at = ? WHERE id = ?",
            (is_favorite as i32, now.to_rfc3339(), id.to_string()),
        )?;

        Ok(Some(Note {
            is_favorite,
            updated_at: now,
            ..existing
        }))
    }

    pub fn delete_note(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM notes WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Bookmark operations
    // ============================================================

    pub fn list_bookmarks(&self, owner: Uuid, filter: &ResourceFilter) -> Result<Vec<Bookmark>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, owner, url, title, description, tags, is_favorite, created_at, updated_at
             FROM bookmarks WHERE owner = ? ORDER BY updated_at DESC",
        )?;

        let bookmarks = stmt
            .query_map([owner.to_string()], bookmark_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(bookmarks
            .into_iter()
            .filter(|b| {
                filter.matches(&[&b.title, &b.description, &b.url], &b.tags, b.is_favorite)
            })
            .collect())
    }

    pub fn get_bookmark(&self, id: Uuid) -> Result<Option<Bookmark>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, owner, url, title, description, tags, is_favorite, created_at, updated_at
             FROM bookmarks WHERE id = ?",
        )?;

        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(bookmark_from_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn create_bookmark(&self, owner: Uuid, input: CreateBookmarkInput) -> Result<Bookmark> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO bookmarks (id, owner, url, title, description, tags, is_favorite, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                owner.to_string(),
                &input.url,
                &input.title,
                &input.description,
                serde_json::to_string(&input.tags)?,
                input.is_favorite as i32,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;

        Ok(Bookmark {
            id,
            owner,
            url: input.url,
            title: input.title,
            description: input.description,
            tags: input.tags,
            is_favorite: input.is_favorite,
            created_at: now,
            updated_at: now,
        })
    }

    /// Merge the provided fields over the stored bookmark and stamp
    /// `updated_at`, even when every value is unchanged.
    pub fn update_bookmark(&self, id: Uuid, input: UpdateBookmarkInput) -> Result<Option<Bookmark>> {
        let Some(existing) = self.get_bookmark(id)? else {
            return Ok(None);
        };

        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();
        let url = input.url.unwrap_or(existing.url);
        let title = input.title.unwrap_or(existing.title);
        let description = input.description.unwrap_or(existing.description);
        let tags = input.tags.unwrap_or(existing.tags);
        let is_favorite = input.is_favorite.unwrap_or(existing.is_favorite);

        conn.execute(
            "UPDATE bookmarks SET url = ?, title = ?, description = ?, tags = ?, is_favorite = ?, updated_at = ?
             WHERE id = ?",
            (
                &url,
                &title,
                &description,
                serde_json::to_string(&tags)?,
                is_favorite as i32,
                now.to_rfc3339(),
                id.to_string(),
            ),
        )?;

        Ok(Some(Bookmark {
            id,
            owner: existing.owner,
            url,
            title,
            description,
            tags,
            is_favorite,
            created_at: existing.created_at,
            updated_at: now,
        }))
    }

    pub fn set_bookmark_favorite(&self, id: Uuid, is_favorite: bool) -> Result<Option<Bookmark>> {
        let Some(existing) = self.get_bookmark(id)? else {
            return Ok(None);
        };

        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();

        conn.execute(
            "UPDATE bookmarks SET is_favorite = ?, updated_at = ? WHERE id = ?",
            (is_favorite as i32, now.to_rfc3339(), id.to_string()),
        )?;

        Ok(Some(Bookmark {
            is_favorite,
            updated_at: now,
            ..existing
        }))
    }

    pub fn delete_bookmark(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM bookmarks WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

fn user_from_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: parse_uuid(row.get::<_, String>(0)?),
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: parse_datetime(row.get::<_, String>(4)?),
    })
}

fn note_from_row(row: &Row) -> rusqlite::Result<Note> {
    let tags_json: String = row.get(4)?;
    Ok(Note {
        id: parse_uuid(row.get::<_, String>(0)?),
        owner: parse_uuid(row.get::<_, String>(1)?),
        title: row.get(2)?,
        content: row.get(3)?,
        tags: serde_json::from_str(&tags_json).unwrap_or_default(),
        is_favorite: row.get::<_, i32>(5)? != 0,
        created_at: parse_datetime(row.get::<_, String>(6)?),
        updated_at: parse_datetime(row.get::<_, String>(7)?),
    })
}

fn bookmark_from_row(row: &Row) -> rusqlite::Result<Bookmark> {
    let tags_json: String = row.get(5)?;
    Ok(Bookmark {
        id: parse_uuid(row.get::<_, String>(0)?),
        owner: parse_uuid(row.get::<_, String>(1)?),
        url: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        tags: serde_json::from_str(&tags_json).unwrap_or_default(),
        is_favorite: row.get::<_, i32>(6)? != 0,
        created_at: parse_datetime(row.get::<_, String>(7)?),
        updated_at: parse_datetime(row.get::<_, String>(8)?),
    })
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
