use super::Id;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: Id,
    pub title: String,

    /// Expected to match some [`super::Author::id`]; not checked on load.
    pub author_id: Id,
}

impl Book {
    pub fn new(id: Id, title: impl Into<String>, author_id: Id) -> Self {
        Self {
            id,
            title: title.into(),
            author_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_uses_camel_case_author_id() {
        let book: Book =
            serde_json::from_str(r#"{"id":1,"title":"T1","authorId":10}"#).unwrap();
        assert_eq!(book, Book::new(1, "T1", 10));

        let json = serde_json::to_string(&book).unwrap();
        assert!(json.contains("\"authorId\":10"));
    }
}
