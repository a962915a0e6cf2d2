//! GraphQL schema, resolvers and the operation pipeline for shelf.
//!
//! ## Schema
//!
//! ```graphql
//! type Author { name: String!  books: [Book] }
//! type Book   { title: String!  author: Author! }
//! type Query  { authors: [Author!]!  books: [Book!]! }
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Serve over HTTP
//! shelf serve --port 4000
//!
//! # Run one operation locally
//! shelf run '{ books { title author { name } } }'
//! ```

mod pipeline;
mod resolvers;
mod schema;
mod types;

pub use pipeline::{
    Execution, Operation, OperationPipeline, Outcome, RequestContext, StageTracking,
};
pub use resolvers::{MASKED_MESSAGE, ResolveError};
pub use schema::{
    AUTHOR, BOOK, LibrarySchema, QUERY, build_schema, build_schema_from, library_graph,
};
pub use types::{
    DeferredResolution, FieldBinder, FieldDescriptor, ObjectType, OutputType, Resolution, Scalar,
    SchemaIssue, TypeGraph, TypeHandle,
};
