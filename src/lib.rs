//! # Shelf - GraphQL over HTTP for a static catalogue
//!
//! Shelf serves a small, read-only dataset of authors and books through a
//! GraphQL API. The dataset is loaded once at startup and shared by every
//! request.
//!
//! ## Quick Start
//!
//! ```bash
//! # Serve the built-in catalogue on port 4000
//! shelf serve
//!
//! # Run one operation without a server
//! shelf run '{ books { title author { name } } }'
//!
//! # Print the schema
//! shelf schema
//! ```
//!
//! ## Modules
//!
//! - [`cli`]: Command-line interface definitions
//! - [`config`]: Configuration loading
//! - [`error`]: Error types and result aliases
//! - [`graphql`]: Type graph, resolvers and the operation pipeline
//! - [`http`]: GraphQL-over-HTTP transport
//! - [`model`]: Data models (`Author`, `Book`)
//! - [`storage`]: The in-memory `DataStore`

/// Command-line interface definitions using clap.
pub mod cli;

/// Configuration loading.
///
/// Handles the optional `shelf.toml` file and its defaults.
pub mod config;

/// Error types and result aliases.
///
/// Defines `ShelfError` enum and `Result<T>` type alias.
pub mod error;

/// GraphQL type graph, resolvers and operation pipeline.
pub mod graphql;

/// GraphQL-over-HTTP transport built on axum.
pub mod http;

/// Data models for the catalogue.
pub mod model;

/// Read-only, in-memory storage.
pub mod storage;

pub mod logging;
