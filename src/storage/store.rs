use crate::{
    error::{Result, ShelfError},
    model::{Author, Book, Id},
};
use serde::Deserialize;
use std::path::Path;

/// The dataset compiled into the binary, used when no `--data` file is given.
const BUILTIN_DATASET: &str = include_str!("../../data/library.json");

/// On-disk shape of a dataset file.
#[derive(Debug, Deserialize)]
struct Dataset {
    #[serde(default)]
    authors: Vec<Author>,
    #[serde(default)]
    books: Vec<Book>,
}

/// Read-only owner of the author and book collections.
///
/// Both collections are loaded once and never mutated, so a single store can be
/// shared (behind an `Arc`) by every request without locking. Lookups are linear
/// scans and always yield records in insertion order.
#[derive(Debug, Clone, Default)]
pub struct DataStore {
    authors: Vec<Author>,
    books: Vec<Book>,
}

impl DataStore {
    pub fn new(authors: Vec<Author>, books: Vec<Book>) -> Self {
        let store = Self { authors, books };
        store.warn_dangling();
        store
    }

    /// Load the dataset shipped with the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_DATASET)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let dataset: Dataset = serde_json::from_str(content)?;
        Ok(Self::new(dataset.authors, dataset.books))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ShelfError::Dataset(format!("failed to read {}: {}", path.display(), e))
        })?;
        let store = Self::from_json(&content)?;
        tracing::info!(
            path = %path.display(),
            authors = store.authors.len(),
            books = store.books.len(),
            "loaded dataset"
        );
        Ok(store)
    }

    pub fn list_authors(&self) -> &[Author] {
        &self.authors
    }

    pub fn list_books(&self) -> &[Book] {
        &self.books
    }

    /// Absence is not an error here; the caller decides what a missing author means.
    pub fn find_author_by_id(&self, id: Id) -> Option<&Author> {
        self.authors.iter().find(|author| author.id == id)
    }

    pub fn list_books_by_author(&self, author_id: Id) -> impl Iterator<Item = &Book> {
        self.books
            .iter()
            .filter(move |book| book.author_id == author_id)
    }

    /// Books whose `author_id` matches no author.
    pub fn dangling_books(&self) -> impl Iterator<Item = &Book> {
        self.books
            .iter()
            .filter(|book| self.find_author_by_id(book.author_id).is_none())
    }

    fn warn_dangling(&self) {
        for book in self.dangling_books() {
            tracing::warn!(
                book = book.id,
                author = book.author_id,
                "book references an unknown author; queries selecting its author will fail"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_store() -> DataStore {
        DataStore::new(
            vec![Author::new(10, "A1"), Author::new(20, "A2")],
            vec![
                Book::new(1, "T1", 10),
                Book::new(2, "T2", 20),
                Book::new(3, "T3", 10),
                Book::new(4, "T4", 99),
            ],
        )
    }

    #[test]
    fn test_find_author_by_id() {
        let store = sample_store();
        assert_eq!(store.find_author_by_id(20).map(|a| a.name.as_str()), Some("A2"));
        assert!(store.find_author_by_id(99).is_none());
    }

    #[test]
    fn test_books_by_author_keep_insertion_order() {
        let store = sample_store();
        let titles: Vec<_> = store
            .list_books_by_author(10)
            .map(|b| b.title.as_str())
            .collect();
        assert_eq!(titles, vec!["T1", "T3"]);
        assert_eq!(store.list_books_by_author(30).count(), 0);
    }

    #[test]
    fn test_dangling_books_are_kept() {
        let store = sample_store();
        assert_eq!(store.list_books().len(), 4);
        let dangling: Vec<_> = store.dangling_books().map(|b| b.id).collect();
        assert_eq!(dangling, vec![4]);
    }

    #[test]
    fn test_builtin_dataset_is_consistent() {
        let store = DataStore::builtin().unwrap();
        assert!(!store.list_authors().is_empty());
        assert!(!store.list_books().is_empty());
        assert_eq!(store.dangling_books().count(), 0);
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("library.json");
        std::fs::write(
            &path,
            r#"{"authors":[{"id":10,"name":"A1"}],"books":[{"id":1,"title":"T1","authorId":10}]}"#,
        )
        .unwrap();

        let store = DataStore::load(&path).unwrap();
        assert_eq!(store.list_authors(), &[Author::new(10, "A1")]);
        assert_eq!(store.list_books(), &[Book::new(1, "T1", 10)]);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = DataStore::load(&temp_dir.path().join("nope.json")).unwrap_err();
        assert!(err.to_string().contains("Dataset error"));
    }

    #[test]
    fn test_malformed_dataset() {
        assert!(DataStore::from_json("{\"authors\": 3}").is_err());
    }
}
