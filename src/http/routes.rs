use std::time::Duration;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use super::decode::{decode_operation, is_json_content_type, read_body};
use super::error::TransportError;
use crate::config::ServerSettings;
use crate::graphql::{OperationPipeline, Outcome};

pub const GRAPHQL_PATH: &str = "/graphql";

/// Media type of every pipeline response.
pub const GRAPHQL_RESPONSE_CONTENT_TYPE: &str = "application/graphql-response+json; charset=utf-8";

const PREFLIGHT_VARY: &str = "Origin, Access-Control-Request-Headers";
const PREFLIGHT_ALLOW_METHODS: &str = "POST, OPTIONS";
/// Chromium caps preflight caching at two hours.
const PREFLIGHT_MAX_AGE: &str = "7200";

const TIMED_OUT_BODY: &str = r#"{"errors":[{"message":"operation timed out"}]}"#;

#[derive(Clone)]
pub struct AppState {
    pipeline: OperationPipeline,
    max_body_bytes: usize,
    request_timeout: Duration,
}

impl AppState {
    pub fn new(pipeline: OperationPipeline, settings: &ServerSettings) -> Self {
        Self {
            pipeline,
            max_body_bytes: settings.max_body_bytes,
            request_timeout: settings.request_timeout(),
        }
    }
}

/// `POST /graphql`, `OPTIONS` anywhere, 404 for everything else.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(GRAPHQL_PATH, post(graphql_handler).fallback(fallback))
        .fallback(fallback)
        .with_state(state)
        // Any origin may call us; a real deployment would narrow this.
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(TraceLayer::new_for_http())
}

async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Body,
) -> Result<Response, TransportError> {
    // Checked before the body is touched so non-JSON requests cost nothing.
    if !is_json_content_type(&headers) {
        return Err(TransportError::UnsupportedContentType);
    }

    let bytes = read_body(&headers, body, state.max_body_bytes).await?;
    let operation = decode_operation(&bytes)?;

    match tokio::time::timeout(state.request_timeout, state.pipeline.run(operation)).await {
        Ok(outcome) => Ok(encode_outcome(&outcome)),
        Err(_) => {
            tracing::warn!(timeout = ?state.request_timeout, "operation timed out");
            Ok(graphql_response(
                StatusCode::SERVICE_UNAVAILABLE,
                TIMED_OUT_BODY.as_bytes().to_vec(),
            ))
        }
    }
}

/// 200 once execution ran, 400 for parse and validation failures.
fn encode_outcome(outcome: &Outcome) -> Response {
    let status = if outcome.is_executed() {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };

    match serde_json::to_vec(outcome) {
        Ok(body) => graphql_response(status, body),
        Err(err) => {
            tracing::error!(error = %err, "failed to encode outcome");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn graphql_response(status: StatusCode, body: Vec<u8>) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, GRAPHQL_RESPONSE_CONTENT_TYPE)],
        body,
    )
        .into_response()
}

async fn fallback(method: Method, headers: HeaderMap) -> Response {
    if method == Method::OPTIONS {
        preflight(&headers)
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

fn preflight(headers: &HeaderMap) -> Response {
    let has_origin = headers
        .get(header::ORIGIN)
        .is_some_and(|origin| !origin.is_empty());
    if !has_origin {
        return TransportError::MissingOrigin.into_response();
    }

    let mut response_headers = HeaderMap::new();
    if let Some(requested) = headers.get(header::ACCESS_CONTROL_REQUEST_HEADERS) {
        response_headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, requested.clone());
    }
    // Intermediate caches must key the preflight on what the browser asked for.
    response_headers.insert(header::VARY, HeaderValue::from_static(PREFLIGHT_VARY));
    response_headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(PREFLIGHT_ALLOW_METHODS),
    );
    response_headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static(PREFLIGHT_MAX_AGE),
    );

    (StatusCode::NO_CONTENT, response_headers).into_response()
}
