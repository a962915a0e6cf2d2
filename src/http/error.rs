//! Transport-level rejections.
//!
//! These never reach the pipeline and are answered with a bare status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Content-Type header must be 'application/json'")]
    UnsupportedContentType,

    #[error("Request body exceeds {0} bytes")]
    BodyTooLarge(usize),

    #[error("Failed to read request body")]
    UnreadableBody,

    #[error("Failed to parse JSON body: {0}")]
    MalformedJson(String),

    #[error("GraphQL operation must be a JSON object")]
    NotAnObject,

    #[error("GraphQL operation 'query' field is required")]
    MissingQuery,

    #[error("GraphQL operation field 'query' must be a string")]
    QueryNotString,

    #[error("GraphQL operation field 'operationName' must be a string")]
    OperationNameNotString,

    #[error("GraphQL operation field 'variables' must be an object")]
    VariablesNotObject,

    #[error("Preflight request is missing the Origin header")]
    MissingOrigin,
}

impl TransportError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            TransportError::BodyTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for TransportError {
    fn into_response(self) -> Response {
        tracing::debug!(error = %self, "rejected request");
        self.status_code().into_response()
    }
}
