//! Domain models.
//!
//! - [`User`]: a registered account; clients only ever see the
//!   [`UserProfile`] projection.
//! - [`Note`]: a short text note owned by exactly one user.
//! - [`Bookmark`]: a saved URL with optional, auto-fetchable title and
//!   description.
//! - [`ResourceFilter`]: the parsed list-query contract shared by notes and
//!   bookmarks.
//!
//! Resources serialize as camelCase JSON (`isFavorite`, `createdAt`), which is
//! the wire format the web client expects.

mod bookmark;
mod note;
mod query;
mod user;

pub use bookmark::*;
pub use note::*;
pub use query::*;
pub use user::*;
