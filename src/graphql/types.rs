//! Crate-owned description of the type graph.
//!
//! Types are declared first and bound second: [`TypeGraph::declare`] registers a
//! name and hands back a [`TypeHandle`], [`TypeGraph::bind`] attaches fields. Field
//! outputs refer to other types by name, so `Author` and `Book` can point at each
//! other regardless of which one is bound first. Nothing reaches the engine until
//! [`TypeGraph::into_builder`] has checked the whole graph.

use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_graphql::dynamic::{
    Field, FieldFuture, FieldValue, Object, ResolverContext, Schema, SchemaBuilder, TypeRef,
};
use thiserror::Error;

use super::pipeline::RequestContext;
use super::resolvers::ResolveError;

/// Built-in scalars a field may produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    String,
    Id,
    Int,
    Boolean,
}

impl Scalar {
    pub fn name(self) -> &'static str {
        match self {
            Scalar::String => TypeRef::STRING,
            Scalar::Id => TypeRef::ID,
            Scalar::Int => TypeRef::INT,
            Scalar::Boolean => TypeRef::BOOLEAN,
        }
    }
}

/// Output type of a field: a base type wrapped in any mix of list and non-null.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputType {
    Scalar(Scalar),
    ObjectRef(String),
    List(Box<OutputType>),
    NonNull(Box<OutputType>),
}

impl OutputType {
    pub fn object(name: impl Into<String>) -> Self {
        OutputType::ObjectRef(name.into())
    }

    pub fn list(inner: impl Into<OutputType>) -> Self {
        OutputType::List(Box::new(inner.into()))
    }

    pub fn non_null(inner: impl Into<OutputType>) -> Self {
        OutputType::NonNull(Box::new(inner.into()))
    }

    /// The object type this output ultimately refers to, if any.
    pub fn object_ref(&self) -> Option<&str> {
        match self {
            OutputType::Scalar(_) => None,
            OutputType::ObjectRef(name) => Some(name),
            OutputType::List(inner) | OutputType::NonNull(inner) => inner.object_ref(),
        }
    }

    fn has_nested_non_null(&self) -> bool {
        match self {
            OutputType::Scalar(_) | OutputType::ObjectRef(_) => false,
            OutputType::NonNull(inner) => {
                matches!(**inner, OutputType::NonNull(_)) || inner.has_nested_non_null()
            }
            OutputType::List(inner) => inner.has_nested_non_null(),
        }
    }

    pub fn to_type_ref(&self) -> TypeRef {
        match self {
            OutputType::Scalar(scalar) => TypeRef::named(scalar.name()),
            OutputType::ObjectRef(name) => TypeRef::named(name.clone()),
            OutputType::List(inner) => TypeRef::List(Box::new(inner.to_type_ref())),
            OutputType::NonNull(inner) => TypeRef::NonNull(Box::new(inner.to_type_ref())),
        }
    }
}

impl From<Scalar> for OutputType {
    fn from(scalar: Scalar) -> Self {
        OutputType::Scalar(scalar)
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputType::Scalar(scalar) => f.write_str(scalar.name()),
            OutputType::ObjectRef(name) => f.write_str(name),
            OutputType::List(inner) => write!(f, "[{}]", inner),
            OutputType::NonNull(inner) => write!(f, "{}!", inner),
        }
    }
}

/// What a resolver hands back: a value, absence, or a typed failure.
pub type Resolution<'a> = std::result::Result<Option<FieldValue<'a>>, ResolveError>;

/// Resolution that only becomes available after awaiting.
pub type DeferredResolution<'a> = Pin<Box<dyn Future<Output = Resolution<'a>> + Send + 'a>>;

type ReadyFn = dyn for<'a> Fn(ResolverContext<'a>) -> Resolution<'a> + Send + Sync;
type DeferredFn = dyn for<'a> Fn(ResolverContext<'a>) -> DeferredResolution<'a> + Send + Sync;

#[derive(Clone)]
enum Resolver {
    Ready(Arc<ReadyFn>),
    Deferred(Arc<DeferredFn>),
}

#[derive(Clone)]
pub struct FieldDescriptor {
    pub output: OutputType,
    pub description: Option<String>,
    resolver: Resolver,
}

impl FieldDescriptor {
    /// A field computed synchronously from its parent and the request context.
    pub fn new<F>(output: impl Into<OutputType>, resolver: F) -> Self
    where
        F: for<'a> Fn(ResolverContext<'a>) -> Resolution<'a> + Send + Sync + 'static,
    {
        Self::with_resolver(output, Resolver::Ready(Arc::new(resolver)))
    }

    /// A field whose value has to be awaited, e.g. one backed by I/O.
    pub fn deferred<F>(output: impl Into<OutputType>, resolver: F) -> Self
    where
        F: for<'a> Fn(ResolverContext<'a>) -> DeferredResolution<'a> + Send + Sync + 'static,
    {
        Self::with_resolver(output, Resolver::Deferred(Arc::new(resolver)))
    }

    fn with_resolver(output: impl Into<OutputType>, resolver: Resolver) -> Self {
        Self {
            output: output.into(),
            description: None,
            resolver,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn into_field(self, name: &str) -> Field {
        let type_ref = self.output.to_type_ref();
        let field_name = name.to_string();
        let field = match self.resolver {
            Resolver::Ready(resolver) => Field::new(name, type_ref, move |ctx| {
                let request_id = request_id(&ctx);
                let resolved =
                    resolver(ctx).map_err(|err| err.into_client_error(&field_name, request_id));
                FieldFuture::new(async move { resolved })
            }),
            Resolver::Deferred(resolver) => Field::new(name, type_ref, move |ctx| {
                let request_id = request_id(&ctx);
                let pending = resolver(ctx);
                let field_name = field_name.clone();
                FieldFuture::new(async move {
                    pending
                        .await
                        .map_err(|err| err.into_client_error(&field_name, request_id))
                })
            }),
        };
        match self.description {
            Some(description) => field.description(description),
            None => field,
        }
    }
}

fn request_id(ctx: &ResolverContext<'_>) -> Option<u64> {
    ctx.ctx.data_opt::<RequestContext>().map(|r| r.request_id)
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("output", &self.output)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct ObjectType {
    pub name: String,
    pub description: Option<String>,
    /// Kept in declaration order; SDL and introspection follow it.
    pub fields: Vec<(String, FieldDescriptor)>,
}

impl ObjectType {
    fn new(name: String) -> Self {
        Self {
            name,
            description: None,
            fields: Vec::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|(field_name, _)| field_name == name)
            .map(|(_, descriptor)| descriptor)
    }

    fn into_object(self) -> Object {
        let mut object = Object::new(self.name);
        if let Some(description) = self.description {
            object = object.description(description);
        }
        for (name, descriptor) in self.fields {
            object = object.field(descriptor.into_field(&name));
        }
        object
    }
}

/// Proof that a type name was declared in a particular graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeHandle {
    index: usize,
    name: String,
}

impl TypeHandle {
    /// Nullable reference to this type, ready to wrap.
    pub fn output(&self) -> OutputType {
        OutputType::object(self.name.clone())
    }
}

/// Structural problems with a type graph, found before any operation runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaIssue {
    #[error("query root type `{0}` is not declared")]
    MissingQueryRoot(String),

    #[error("type `{0}` is declared more than once")]
    DuplicateType(String),

    #[error("type `{0}` was bound without being declared")]
    UndeclaredType(String),

    #[error("type `{0}` declares no fields")]
    EmptyType(String),

    #[error("`{0}` is not a valid GraphQL name")]
    InvalidName(String),

    #[error("field `{type_name}.{field}` is declared more than once")]
    DuplicateField { type_name: String, field: String },

    #[error("field `{type_name}.{field}` references unknown type `{target}`")]
    UnknownType {
        type_name: String,
        field: String,
        target: String,
    },

    #[error("field `{type_name}.{field}` wraps a non-null type in non-null")]
    NestedNonNull { type_name: String, field: String },

    #[error("engine rejected schema: {0}")]
    Engine(String),
}

#[derive(Debug)]
pub struct TypeGraph {
    query: String,
    types: Vec<ObjectType>,
    issues: Vec<SchemaIssue>,
}

impl TypeGraph {
    pub fn new(query_root: impl Into<String>) -> Self {
        Self {
            query: query_root.into(),
            types: Vec::new(),
            issues: Vec::new(),
        }
    }

    /// Phase one: register a type name. Fields come later through [`Self::bind`].
    pub fn declare(&mut self, name: impl Into<String>) -> TypeHandle {
        let name = name.into();
        let index = self.types.len();
        self.types.push(ObjectType::new(name.clone()));
        TypeHandle { index, name }
    }

    /// Phase two: attach a description and fields to a declared type.
    pub fn bind(&mut self, handle: &TypeHandle) -> FieldBinder<'_> {
        let index = match self.types.get(handle.index) {
            Some(object) if object.name == handle.name => Some(handle.index),
            _ => {
                self.issues
                    .push(SchemaIssue::UndeclaredType(handle.name.clone()));
                None
            }
        };
        FieldBinder { graph: self, index }
    }

    pub fn get(&self, name: &str) -> Option<&ObjectType> {
        self.types.iter().find(|object| object.name == name)
    }

    /// Check the graph as a whole; an empty list means it can be handed to the engine.
    pub fn validate(&self) -> Vec<SchemaIssue> {
        let mut issues = self.issues.clone();

        let mut declared = HashSet::new();
        for object in &self.types {
            if !is_valid_name(&object.name) {
                issues.push(SchemaIssue::InvalidName(object.name.clone()));
            }
            if !declared.insert(object.name.as_str()) {
                issues.push(SchemaIssue::DuplicateType(object.name.clone()));
            }
        }

        if !declared.contains(self.query.as_str()) {
            issues.push(SchemaIssue::MissingQueryRoot(self.query.clone()));
        }

        for object in &self.types {
            if object.fields.is_empty() {
                issues.push(SchemaIssue::EmptyType(object.name.clone()));
            }

            let mut seen = HashSet::new();
            for (field, descriptor) in &object.fields {
                if !is_valid_name(field) {
                    issues.push(SchemaIssue::InvalidName(format!("{}.{}", object.name, field)));
                }
                if !seen.insert(field.as_str()) {
                    issues.push(SchemaIssue::DuplicateField {
                        type_name: object.name.clone(),
                        field: field.clone(),
                    });
                }
                if descriptor.output.has_nested_non_null() {
                    issues.push(SchemaIssue::NestedNonNull {
                        type_name: object.name.clone(),
                        field: field.clone(),
                    });
                }
                if let Some(target) = descriptor.output.object_ref() {
                    if !declared.contains(target) {
                        issues.push(SchemaIssue::UnknownType {
                            type_name: object.name.clone(),
                            field: field.clone(),
                            target: target.to_string(),
                        });
                    }
                }
            }
        }

        issues
    }

    /// Validate, then register every object with a fresh engine schema builder.
    pub fn into_builder(self) -> std::result::Result<SchemaBuilder, Vec<SchemaIssue>> {
        let issues = self.validate();
        if !issues.is_empty() {
            return Err(issues);
        }

        let TypeGraph { query, types, .. } = self;
        let builder = types
            .into_iter()
            .fold(Schema::build(&query, None, None), |builder, object| {
                builder.register(object.into_object())
            });
        Ok(builder)
    }
}

pub struct FieldBinder<'g> {
    graph: &'g mut TypeGraph,
    index: Option<usize>,
}

impl FieldBinder<'_> {
    fn target(&mut self) -> Option<&mut ObjectType> {
        self.index.and_then(|index| self.graph.types.get_mut(index))
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        if let Some(object) = self.target() {
            object.description = Some(description.into());
        }
        self
    }

    pub fn field(mut self, name: impl Into<String>, descriptor: FieldDescriptor) -> Self {
        if let Some(object) = self.target() {
            object.fields.push((name.into(), descriptor));
        }
        self
    }
}

/// `/[_A-Za-z][_0-9A-Za-z]*/`, excluding the reserved `__` prefix.
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_well = chars
        .next()
        .is_some_and(|c| c == '_' || c.is_ascii_alphabetic());
    starts_well
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        && !name.starts_with("__")
}
