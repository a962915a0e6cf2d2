//! Parse → validate → execute, collapsed into exactly one [`Outcome`].
//!
//! The engine runs all three stages inside a single `execute` call. A schema
//! extension ([`StageTracking`]) records how far each request got, which is
//! what tells a syntax error apart from a validation error and from an
//! execution that merely reported errors.
//!
//! Selecting the operation and checking required variables belong to the
//! execute stage: a request that fails there is [`Outcome::Executed`] with
//! errors and no `data`.

use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use async_graphql::extensions::{
    Extension, ExtensionContext, ExtensionFactory, NextExecute, NextParseQuery, NextValidation,
};
use async_graphql::parser::types::ExecutableDocument;
use async_graphql::{
    Name, Request, Response, ServerError, ServerResult, ValidationResult, Value, Variables,
};
use serde::{Serialize, Serializer};
use tracing::Instrument;

use super::schema::LibrarySchema;

/// A client-submitted operation, already structurally checked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Operation {
    pub query: String,
    pub operation_name: Option<String>,
    pub variables: Option<serde_json::Map<String, serde_json::Value>>,
}

impl Operation {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    pub fn with_variables(mut self, variables: serde_json::Map<String, serde_json::Value>) -> Self {
        self.variables = Some(variables);
        self
    }

    fn into_request(self) -> Request {
        let mut request = Request::new(self.query);
        if let Some(name) = self.operation_name {
            request = request.operation_name(name);
        }
        if let Some(variables) = self.variables {
            request = request.variables(Variables::from_json(serde_json::Value::Object(variables)));
        }
        request
    }
}

/// Per-request data visible to resolvers.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext {
    pub request_id: u64,
}

/// The single result of running one operation.
#[derive(Debug)]
pub enum Outcome {
    /// The query text could not be parsed; nothing else ran.
    ParseFailure(ServerError),
    /// The document broke a validation rule; nothing was executed.
    ValidationFailure(Vec<ServerError>),
    /// Execution was reached; `data` may be partial and `errors` non-empty.
    Executed(Execution),
}

/// Result of the execute stage.
///
/// `data` is `None` when the request was refused before any field resolved:
/// no operation could be selected, or a required variable was not provided.
#[derive(Debug, Serialize)]
pub struct Execution {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ServerError>,
}

impl Outcome {
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::ParseFailure(_) => "parse failure",
            Outcome::ValidationFailure(_) => "validation failure",
            Outcome::Executed(_) => "executed",
        }
    }

    pub fn is_executed(&self) -> bool {
        matches!(self, Outcome::Executed(_))
    }

    pub fn errors(&self) -> &[ServerError] {
        match self {
            Outcome::ParseFailure(error) => std::slice::from_ref(error),
            Outcome::ValidationFailure(errors) => errors,
            Outcome::Executed(execution) => &execution.errors,
        }
    }
}

#[derive(Serialize)]
struct ErrorsOnly<'a> {
    errors: &'a [ServerError],
}

/// `{data, errors?}` once executed, `{errors}` otherwise.
impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Outcome::Executed(execution) => execution.serialize(serializer),
            rejected => ErrorsOnly {
                errors: rejected.errors(),
            }
            .serialize(serializer),
        }
    }
}

#[derive(Clone)]
pub struct OperationPipeline {
    schema: LibrarySchema,
    next_request_id: Arc<AtomicU64>,
}

impl OperationPipeline {
    pub fn new(schema: LibrarySchema) -> Self {
        Self {
            schema,
            next_request_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn schema(&self) -> &LibrarySchema {
        &self.schema
    }

    pub async fn run(&self, operation: Operation) -> Outcome {
        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let span = tracing::info_span!(
            "operation",
            request_id,
            name = operation.operation_name.as_deref().unwrap_or("")
        );
        self.run_tracked(request_id, operation).instrument(span).await
    }

    async fn run_tracked(&self, request_id: u64, operation: Operation) -> Outcome {
        let marker = Arc::new(StageMarker::default());
        let request = operation
            .into_request()
            .data(Arc::clone(&marker))
            .data(RequestContext { request_id });

        let response = self.schema.execute(request).await;
        let outcome = classify(marker.reached(), response);

        match &outcome {
            Outcome::Executed(Execution { data: None, errors }) => {
                tracing::debug!(errors = errors.len(), "request refused before execution");
            }
            Outcome::Executed(Execution { errors, .. }) if !errors.is_empty() => {
                tracing::debug!(errors = errors.len(), "executed with errors");
            }
            Outcome::Executed(_) => tracing::debug!("executed"),
            rejected => {
                for error in rejected.errors() {
                    tracing::debug!(kind = rejected.kind(), message = %error.message, "operation rejected");
                }
            }
        }
        outcome
    }
}

fn classify(stage: Stage, response: Response) -> Outcome {
    match stage {
        Stage::Received => {
            let error = response
                .errors
                .into_iter()
                .next()
                .unwrap_or_else(|| ServerError::new("unable to parse query", None));
            Outcome::ParseFailure(syntax_error(error))
        }
        Stage::Parsed => Outcome::ValidationFailure(response.errors),
        // Operation selection and variable checks failed after validation passed.
        Stage::Validated => Outcome::Executed(Execution {
            data: None,
            errors: response.errors,
        }),
        Stage::Executing => Outcome::Executed(Execution {
            data: Some(response.data),
            errors: response.errors,
        }),
    }
}

fn syntax_error(mut error: ServerError) -> ServerError {
    error.message = format!("Syntax Error: {}", error.message);
    error
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
enum Stage {
    Received = 0,
    Parsed = 1,
    Validated = 2,
    Executing = 3,
}

/// Errors to report for an operation instead of executing it.
type RequestErrors = Vec<(Option<Name>, Vec<ServerError>)>;

/// Per-request bookkeeping written by [`StageTracking`].
#[derive(Debug, Default)]
struct StageMarker {
    /// Furthest stage reached. Only ever moves forward.
    reached: AtomicU8,
    unprovided: OnceLock<RequestErrors>,
}

impl StageMarker {
    fn advance(&self, stage: Stage) {
        self.reached.fetch_max(stage as u8, Ordering::AcqRel);
    }

    fn reached(&self) -> Stage {
        match self.reached.load(Ordering::Acquire) {
            0 => Stage::Received,
            1 => Stage::Parsed,
            2 => Stage::Validated,
            _ => Stage::Executing,
        }
    }

    fn record_unprovided(&self, errors: RequestErrors) {
        let _ = self.unprovided.set(errors);
    }

    fn unprovided_for(&self, operation_name: Option<&str>) -> Option<Vec<ServerError>> {
        self.unprovided
            .get()?
            .iter()
            .find(|(name, _)| name.as_ref().map(|name| name.as_str()) == operation_name)
            .map(|(_, errors)| errors.clone())
    }
}

/// Required variables each operation of `document` is missing.
///
/// A non-null variable must be present and not null, unless it is absent and
/// has a default.
fn unprovided_variables(document: &ExecutableDocument, variables: &Variables) -> RequestErrors {
    document
        .operations
        .iter()
        .filter_map(|(name, operation)| {
            let errors: Vec<ServerError> = operation
                .node
                .variable_definitions
                .iter()
                .filter(|definition| !definition.node.var_type.node.nullable)
                .filter_map(|definition| {
                    let variable = &definition.node;
                    let message = match variables.get(&variable.name.node) {
                        None if variable.default_value.is_none() => format!(
                            r#"Variable "${}" of required type "{}" was not provided."#,
                            variable.name.node, variable.var_type.node
                        ),
                        Some(Value::Null) => format!(
                            r#"Variable "${}" of non-null type "{}" must not be null."#,
                            variable.name.node, variable.var_type.node
                        ),
                        _ => return None,
                    };
                    Some(ServerError::new(message, Some(definition.pos)))
                })
                .collect();
            (!errors.is_empty()).then(|| (name.cloned(), errors))
        })
        .collect()
}

/// Schema extension feeding each request's [`StageMarker`].
pub struct StageTracking;

impl ExtensionFactory for StageTracking {
    fn create(&self) -> Arc<dyn Extension> {
        Arc::new(StageTrackingExtension)
    }
}

struct StageTrackingExtension;

fn advance(ctx: &ExtensionContext<'_>, stage: Stage) {
    if let Some(marker) = ctx.data_opt::<Arc<StageMarker>>() {
        marker.advance(stage);
    }
}

#[async_trait::async_trait]
impl Extension for StageTrackingExtension {
    async fn parse_query(
        &self,
        ctx: &ExtensionContext<'_>,
        query: &str,
        variables: &Variables,
        next: NextParseQuery<'_>,
    ) -> ServerResult<ExecutableDocument> {
        let document = next.run(ctx, query, variables).await?;
        if let Some(marker) = ctx.data_opt::<Arc<StageMarker>>() {
            marker.record_unprovided(unprovided_variables(&document, variables));
            marker.advance(Stage::Parsed);
        }
        Ok(document)
    }

    async fn validation(
        &self,
        ctx: &ExtensionContext<'_>,
        next: NextValidation<'_>,
    ) -> Result<ValidationResult, Vec<ServerError>> {
        let result = next.run(ctx).await?;
        advance(ctx, Stage::Validated);
        Ok(result)
    }

    async fn execute(
        &self,
        ctx: &ExtensionContext<'_>,
        operation_name: Option<&str>,
        next: NextExecute<'_>,
    ) -> Response {
        if let Some(marker) = ctx.data_opt::<Arc<StageMarker>>() {
            if let Some(errors) = marker.unprovided_for(operation_name) {
                return Response::from_errors(errors);
            }
            marker.advance(Stage::Executing);
        }
        next.run(ctx, operation_name).await
    }
}
