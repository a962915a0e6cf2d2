//! In-memory storage layer for the catalogue.
//!
//! The dataset is a single JSON document:
//!
//! ```json
//! {
//!   "authors": [{ "id": 10, "name": "A1" }],
//!   "books": [{ "id": 1, "title": "T1", "authorId": 10 }]
//! }
//! ```
//!
//! It is read once at startup into a [`DataStore`] and never written again.

mod store;

pub use store::DataStore;
