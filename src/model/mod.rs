//! Data models for the catalogue.
//!
//! This module defines the two stored records:
//!
//! - [`Author`]: a person who wrote one or more books
//! - [`Book`]: a title, pointing at exactly one author through `author_id`
//!
//! The author-to-books direction is never stored; it is derived at query time
//! by [`crate::storage::DataStore::list_books_by_author`].

mod author;
mod book;

pub use author::Author;
pub use book::Book;

/// Identifier shared by authors and books.
pub type Id = u64;
