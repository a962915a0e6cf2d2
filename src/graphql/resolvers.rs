//! Field resolvers backed by the [`DataStore`].
//!
//! Every resolver is a plain function from its [`ResolverContext`] to a
//! [`Resolution`]. They only read: the store comes from schema data, the parent
//! from the enclosing field.

use std::any::Any;
use std::sync::Arc;

use async_graphql::ErrorExtensions;
use async_graphql::dynamic::{FieldValue, ResolverContext};
use thiserror::Error;

use super::types::Resolution;
use crate::model::{Author, Book, Id};
use crate::storage::DataStore;

/// Message clients see in place of an internal resolver failure.
pub const MASKED_MESSAGE: &str = "Internal server error";

#[derive(Error, Debug)]
pub enum ResolveError {
    /// The book's `authorId` matches no stored author.
    #[error("Author {author} of book {book} does not exist")]
    AuthorNotFound { book: Id, author: Id },

    /// Anything the client has no business seeing.
    #[error("{0}")]
    Internal(String),
}

impl From<async_graphql::Error> for ResolveError {
    fn from(err: async_graphql::Error) -> Self {
        ResolveError::Internal(err.message)
    }
}

impl ResolveError {
    pub fn code(&self) -> &'static str {
        match self {
            ResolveError::AuthorNotFound { .. } => "NOT_FOUND",
            ResolveError::Internal(_) => "INTERNAL",
        }
    }

    /// Convert into the error the engine reports, masking internal detail.
    pub fn into_client_error(self, field: &str, request_id: Option<u64>) -> async_graphql::Error {
        let code = self.code();
        let message = match self {
            ResolveError::Internal(detail) => {
                tracing::error!(field, request_id, %detail, "resolver failed");
                MASKED_MESSAGE.to_string()
            }
            domain => {
                tracing::debug!(field, request_id, error = %domain, "resolver rejected");
                domain.to_string()
            }
        };
        async_graphql::Error::new(message).extend_with(|_, extensions| extensions.set("code", code))
    }
}

fn store<'a>(ctx: &ResolverContext<'a>) -> Result<&'a DataStore, ResolveError> {
    Ok(ctx.ctx.data::<Arc<DataStore>>()?.as_ref())
}

fn parent<'a, T: Any + Send + Sync>(ctx: &ResolverContext<'a>) -> Result<&'a T, ResolveError> {
    Ok(ctx.parent_value.try_downcast_ref::<T>()?)
}

pub fn query_authors(ctx: ResolverContext<'_>) -> Resolution<'_> {
    let authors = store(&ctx)?.list_authors();
    Ok(Some(FieldValue::list(
        authors.iter().map(|author| FieldValue::borrowed_any(author)),
    )))
}

pub fn query_books(ctx: ResolverContext<'_>) -> Resolution<'_> {
    let books = store(&ctx)?.list_books();
    Ok(Some(FieldValue::list(
        books.iter().map(|book| FieldValue::borrowed_any(book)),
    )))
}

pub fn author_name(ctx: ResolverContext<'_>) -> Resolution<'_> {
    let author = parent::<Author>(&ctx)?;
    Ok(Some(FieldValue::value(author.name.clone())))
}

pub fn author_books(ctx: ResolverContext<'_>) -> Resolution<'_> {
    let author = parent::<Author>(&ctx)?;
    let books = store(&ctx)?.list_books_by_author(author.id);
    Ok(Some(FieldValue::list(
        books.map(|book| FieldValue::borrowed_any(book)),
    )))
}

pub fn book_title(ctx: ResolverContext<'_>) -> Resolution<'_> {
    let book = parent::<Book>(&ctx)?;
    Ok(Some(FieldValue::value(book.title.clone())))
}

pub fn book_author(ctx: ResolverContext<'_>) -> Resolution<'_> {
    let book = parent::<Book>(&ctx)?;
    let author = store(&ctx)?
        .find_author_by_id(book.author_id)
        .ok_or(ResolveError::AuthorNotFound {
            book: book.id,
            author: book.author_id,
        })?;
    Ok(Some(FieldValue::borrowed_any(author)))
}
