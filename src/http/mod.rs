//! GraphQL over HTTP.
//!
//! - `POST /graphql` with `content-type: application/json` runs an operation
//! - `OPTIONS` on any path answers the CORS preflight
//! - anything else is a 404
//!
//! Every response allows any origin.

mod decode;
mod error;
mod routes;
mod server;

pub use decode::{decode_operation, is_json_content_type};
pub use error::TransportError;
pub use routes::{AppState, GRAPHQL_PATH, GRAPHQL_RESPONSE_CONTENT_TYPE, router};
pub use server::{serve, serve_on};
