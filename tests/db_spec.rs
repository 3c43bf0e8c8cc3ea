use notemark::db::Database;
use notemark::models::*;
use speculate2::speculate;
use uuid::Uuid;

fn create_test_user(db: &Database, email: &str) -> User {
    db.create_user(NewUser {
        name: "Test User".to_string(),
        email: email.to_string(),
        password_hash: "$argon2id$stub".to_string(),
    })
    .expect("Failed to create user")
}

fn note_input(title: &str) -> CreateNoteInput {
    CreateNoteInput {
        title: title.to_string(),
        content: "content".to_string(),
        tags: vec![],
        is_favorite: false,
    }
}

speculate! {
    before {
        let db = Database::open_memory().expect("Failed to create in-memory database");
        db.migrate().expect("Failed to run migrations");
    }

    describe "users" {
        it "finds users by exact email" {
            let created = create_test_user(&db, "ada@example.com");

            let found = db.get_user_by_email("ada@example.com").expect("Query failed");
            assert_eq!(found.map(|u| u.id), Some(created.id));

            let missing = db.get_user_by_email("nobody@example.com").expect("Query failed");
            assert!(missing.is_none());
        }

        it "returns users by id with the stored hash" {
            let created = create_test_user(&db, "ada@example.com");

            let found = db.get_user(created.id).expect("Query failed").unwrap();
            assert_eq!(found.email, "ada@example.com");
            assert_eq!(found.password_hash, "$argon2id$stub");
        }

        it "returns None for an unknown id" {
            assert!(db.get_user(Uuid::new_v4()).expect("Query failed").is_none());
        }
    }

    describe "notes" {
        it "creates a note with both timestamps equal" {
            let user = create_test_user(&db, "ada@example.com");

            let note = db.create_note(user.id, note_input("First")).expect("Failed to create");

            assert_eq!(note.owner, user.id);
            assert_eq!(note.created_at, note.updated_at);
            assert!(db.get_note(note.id).expect("Query failed").is_some());
        }

        it "returns None for a non-existent note" {
            assert!(db.get_note(Uuid::new_v4()).expect("Query failed").is_none());
        }

        it "lists only the owner's notes, newest change first" {
            let user = create_test_user(&db, "ada@example.com");
            let other = create_test_user(&db, "other@example.com");

            let first = db.create_note(user.id, note_input("First")).expect("create");
            db.create_note(user.id, note_input("Second")).expect("create");
            db.create_note(other.id, note_input("Foreign")).expect("create");

            let notes = db.list_notes(user.id, &ResourceFilter::default()).expect("Query failed");
            let titles: Vec<&str> = notes.iter().map(|n| n.title.as_str()).collect();
            assert_eq!(titles, vec!["Second", "First"]);

            // An update moves the note to the front of the list.
            db.update_note(first.id, UpdateNoteInput::default()).expect("update");
            let notes = db.list_notes(user.id, &ResourceFilter::default()).expect("Query failed");
            assert_eq!(notes[0].title, "First");
        }

        it "applies text, tag, and favorite filters" {
            let user = create_test_user(&db, "ada@example.com");

            db.create_note(user.id, CreateNoteInput {
                title: "Shopping".to_string(),
                content: "milk,eggs".to_string(),
                tags: vec!["home".to_string()],
                is_favorite: false,
            }).expect("create");
            db.create_note(user.id, CreateNoteInput {
                title: "Standup".to_string(),
                content: "notes".to_string(),
                tags: vec!["work".to_string()],
                is_favorite: true,
            }).expect("create");

            let by_text = db.list_notes(user.id, &ResourceFilter::from_params(Some("MILK"), None, None))
                .expect("Query failed");
            assert_eq!(by_text.len(), 1);
            assert_eq!(by_text[0].title, "Shopping");

            let by_tag = db.list_notes(user.id, &ResourceFilter::from_params(None, Some("work"), None))
                .expect("Query failed");
            assert_eq!(by_tag.len(), 1);
            assert_eq!(by_tag[0].title, "Standup");

            let favorites = db.list_notes(user.id, &ResourceFilter::from_params(None, None, Some("true")))
                .expect("Query failed");
            assert_eq!(favorites.len(), 1);
            assert_eq!(favorites[0].title, "Standup");
        }

        it "merges partial updates and keeps the owner" {
            let user = create_test_user(&db, "ada@example.com");
            let note = db.create_note(user.id, note_input("Old")).expect("create");

            let updated = db.update_note(note.id, UpdateNoteInput {
                title: Some("New".to_string()),
                ..Default::default()
            }).expect("update").unwrap();

            assert_eq!(updated.title, "New");
            assert_eq!(updated.content, "content");
            assert_eq!(updated.owner, user.id);
            assert_eq!(updated.created_at, note.created_at);
            assert!(updated.updated_at > note.updated_at);

            // The merge is persisted, not just echoed back.
            let reread = db.get_note(note.id).expect("Query failed").unwrap();
            assert_eq!(reread.title, "New");
        }

        it "returns None when updating a missing note" {
            let result = db.update_note(Uuid::new_v4(), UpdateNoteInput::default()).expect("update");
            assert!(result.is_none());
        }

        it "sets the favorite flag and stamps updated_at" {
            let user = create_test_user(&db, "ada@example.com");
            let note = db.create_note(user.id, note_input("T")).expect("create");

            let favored = db.set_note_favorite(note.id, true).expect("update").unwrap();
            assert!(favored.is_favorite);
            assert!(favored.updated_at > note.updated_at);

            let reread = db.get_note(note.id).expect("Query failed").unwrap();
            assert!(reread.is_favorite);
        }

        it "reports whether a delete removed anything" {
            let user = create_test_user(&db, "ada@example.com");
            let note = db.create_note(user.id, note_input("T")).expect("create");

            assert!(db.delete_note(note.id).expect("delete"));
            assert!(!db.delete_note(note.id).expect("delete"));
            assert!(db.get_note(note.id).expect("Query failed").is_none());
        }
    }

    describe "bookmarks" {
        it "stores and rereads tags as a sequence" {
            let user = create_test_user(&db, "ada@example.com");

            let bookmark = db.create_bookmark(user.id, CreateBookmarkInput {
                url: "example.com".to_string(),
                title: "Example".to_string(),
                description: String::new(),
                tags: vec!["reading".to_string(), "later".to_string()],
                is_favorite: false,
            }).expect("create");

            let reread = db.get_bookmark(bookmark.id).expect("Query failed").unwrap();
            assert_eq!(reread.tags, vec!["reading", "later"]);
            assert_eq!(reread.url, "example.com");
        }

        it "searches across title, description, and url" {
            let user = create_test_user(&db, "ada@example.com");

            db.create_bookmark(user.id, CreateBookmarkInput {
                url: "rust-lang.org".to_string(),
                title: "Language".to_string(),
                description: String::new(),
                tags: vec![],
                is_favorite: false,
            }).expect("create");

            let hits = db.list_bookmarks(user.id, &ResourceFilter::from_params(Some("rust"), None, None))
                .expect("Query failed");
            assert_eq!(hits.len(), 1);

            let misses = db.list_bookmarks(user.id, &ResourceFilter::from_params(Some("python"), None, None))
                .expect("Query failed");
            assert!(misses.is_empty());
        }

        it "merges partial updates without touching the url" {
            let user = create_test_user(&db, "ada@example.com");
            let bookmark = db.create_bookmark(user.id, CreateBookmarkInput {
                url: "example.com".to_string(),
                title: "Old".to_string(),
                description: String::new(),
                tags: vec![],
                is_favorite: false,
            }).expect("create");

            let updated = db.update_bookmark(bookmark.id, UpdateBookmarkInput {
                title: Some("New".to_string()),
                ..Default::default()
            }).expect("update").unwrap();

            assert_eq!(updated.title, "New");
            assert_eq!(updated.url, "example.com");
            assert!(updated.updated_at > bookmark.updated_at);
        }

        it "toggles the favorite flag in place" {
            let user = create_test_user(&db, "ada@example.com");
            let bookmark = db.create_bookmark(user.id, CreateBookmarkInput {
                url: "example.com".to_string(),
                title: String::new(),
                description: String::new(),
                tags: vec![],
                is_favorite: false,
            }).expect("create");

            let favored = db.set_bookmark_favorite(bookmark.id, true).expect("update").unwrap();
            assert!(favored.is_favorite);
            assert!(db.get_bookmark(bookmark.id).expect("Query failed").unwrap().is_favorite);
        }

        it "deletes permanently" {
            let user = create_test_user(&db, "ada@example.com");
            let bookmark = db.create_bookmark(user.id, CreateBookmarkInput {
                url: "example.com".to_string(),
                title: String::new(),
                description: String::new(),
                tags: vec![],
                is_favorite: false,
            }).expect("create");

            assert!(db.delete_bookmark(bookmark.id).expect("delete"));
            assert!(db.get_bookmark(bookmark.id).expect("Query failed").is_none());
        }
    }

    describe "on-disk store" {
        it "persists across reopen" {
            let dir = tempfile::tempdir().expect("Failed to create tempdir");
            let path = dir.path().join("data").join("notemark.db");

            let user_id = {
                let db = Database::open(path.clone()).expect("Failed to open database");
                db.migrate().expect("Failed to migrate");
                let user = create_test_user(&db, "ada@example.com");
                db.create_note(user.id, note_input("Durable")).expect("create");
                user.id
            };

            let db = Database::open(path).expect("Failed to reopen database");
            db.migrate().expect("Failed to migrate");
            let notes = db.list_notes(user_id, &ResourceFilter::default()).expect("Query failed");
            assert_eq!(notes.len(), 1);
            assert_eq!(notes[0].title, "Durable");
        }
    }
}
