use std::sync::Arc;

use async_graphql::dynamic::Schema;

use super::pipeline::StageTracking;
use super::resolvers;
use super::types::{FieldDescriptor, OutputType, Scalar, SchemaIssue, TypeGraph};
use crate::config::SchemaSettings;
use crate::storage::DataStore;

pub type LibrarySchema = Schema;

pub const QUERY: &str = "Query";
pub const AUTHOR: &str = "Author";
pub const BOOK: &str = "Book";

/// Declare the catalogue's type graph: `Author`, `Book` and the `Query` root.
pub fn library_graph() -> TypeGraph {
    let mut graph = TypeGraph::new(QUERY);

    let author = graph.declare(AUTHOR);
    let book = graph.declare(BOOK);
    let query = graph.declare(QUERY);

    graph
        .bind(&author)
        .description("An author.")
        .field(
            "name",
            FieldDescriptor::new(OutputType::non_null(Scalar::String), resolvers::author_name)
                .description("The author's name."),
        )
        .field(
            "books",
            FieldDescriptor::new(OutputType::list(book.output()), resolvers::author_books)
                .description("A list of books relating to this author."),
        );

    graph
        .bind(&book)
        .description("A book.")
        .field(
            "title",
            FieldDescriptor::new(OutputType::non_null(Scalar::String), resolvers::book_title)
                .description("The book's title."),
        )
        .field(
            "author",
            FieldDescriptor::new(OutputType::non_null(author.output()), resolvers::book_author)
                .description("The author of this book."),
        );

    graph
        .bind(&query)
        .field(
            "authors",
            FieldDescriptor::new(
                OutputType::non_null(OutputType::list(OutputType::non_null(author.output()))),
                resolvers::query_authors,
            )
            .description("List all authors."),
        )
        .field(
            "books",
            FieldDescriptor::new(
                OutputType::non_null(OutputType::list(OutputType::non_null(book.output()))),
                resolvers::query_books,
            )
            .description("List all books."),
        );

    graph
}

/// Build the catalogue schema over `store`.
///
/// This is the single structural check of the schema; callers must not start
/// serving when it fails.
pub fn build_schema(
    store: Arc<DataStore>,
    settings: &SchemaSettings,
) -> Result<LibrarySchema, Vec<SchemaIssue>> {
    build_schema_from(library_graph(), store, settings)
}

/// Build an arbitrary graph with the same data, limits and stage tracking as
/// [`build_schema`].
pub fn build_schema_from(
    graph: TypeGraph,
    store: Arc<DataStore>,
    settings: &SchemaSettings,
) -> Result<LibrarySchema, Vec<SchemaIssue>> {
    graph
        .into_builder()?
        .data(store)
        .extension(StageTracking)
        .limit_depth(settings.max_depth)
        .finish()
        .map_err(|err| vec![SchemaIssue::Engine(err.0)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_graph_is_valid() {
        assert!(library_graph().validate().is_empty());
    }

    #[test]
    fn test_library_graph_nullability() {
        let graph = library_graph();

        let book = graph.get(BOOK).unwrap();
        assert_eq!(book.field("title").unwrap().output.to_string(), "String!");
        assert_eq!(book.field("author").unwrap().output.to_string(), "Author!");

        let author = graph.get(AUTHOR).unwrap();
        assert_eq!(author.field("name").unwrap().output.to_string(), "String!");
        assert_eq!(author.field("books").unwrap().output.to_string(), "[Book]");

        let query = graph.get(QUERY).unwrap();
        assert_eq!(query.field("authors").unwrap().output.to_string(), "[Author!]!");
        assert_eq!(query.field("books").unwrap().output.to_string(), "[Book!]!");
    }

    #[test]
    fn test_sdl_lists_types() {
        let schema = build_schema(
            Arc::new(DataStore::default()),
            &SchemaSettings::default(),
        )
        .unwrap();
        let sdl = schema.sdl();
        assert!(sdl.contains("type Author"));
        assert!(sdl.contains("type Book"));
        assert!(sdl.contains("books: [Book!]!"));
        assert!(!sdl.contains("id: ID"));
    }
}
