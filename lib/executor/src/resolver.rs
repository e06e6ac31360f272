use std::{any::Any, collections::BTreeMap};

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    context::ExecutionContext,
    execution::node::ExecutionNode,
    request_state::RequestState,
    response::{
        graphql_error::{Location, ResponsePath},
        value::ResponseValue,
    },
    schema::{directives::Arguments, field::FieldDescriptor, Schema},
};

/// Everything a resolver may want to know about the field instance it resolves.
pub struct Info<'a> {
    pub node: &'a ExecutionNode,
    pub field: &'a FieldDescriptor,
    pub schema: &'a Schema,
    /// Runtime path, list indices included.
    pub path: &'a ResponsePath,
    pub location: Location,
    pub context: &'a ExecutionContext,
    /// Runtime type of the parent value.
    pub parent_type_name: &'a str,
}

#[async_trait]
pub trait Resolver: Send + Sync {
    async fn resolve(
        &self,
        parent: &Value,
        arguments: &Arguments,
        state: &RequestState,
        info: &Info<'_>,
    ) -> Result<Value, ResolverError>;
}

/// Reads `parent[field_name]`, `null` when the property is absent.
pub struct DefaultResolver;

#[async_trait]
impl Resolver for DefaultResolver {
    async fn resolve(
        &self,
        parent: &Value,
        _arguments: &Arguments,
        _state: &RequestState,
        info: &Info<'_>,
    ) -> Result<Value, ResolverError> {
        Ok(parent.get(&info.field.name).cloned().unwrap_or(Value::Null))
    }
}

pub(crate) struct TypenameResolver;

#[async_trait]
impl Resolver for TypenameResolver {
    async fn resolve(
        &self,
        _parent: &Value,
        _arguments: &Arguments,
        _state: &RequestState,
        info: &Info<'_>,
    ) -> Result<Value, ResolverError> {
        Ok(Value::String(info.parent_type_name.to_string()))
    }
}

pub struct FnResolver<F>(F);

/// Wraps a synchronous closure into a [`Resolver`].
pub fn resolver_fn<F>(f: F) -> FnResolver<F>
where
    F: Fn(&Value, &Arguments, &RequestState, &Info<'_>) -> Result<Value, ResolverError>
        + Send
        + Sync,
{
    FnResolver(f)
}

#[async_trait]
impl<F> Resolver for FnResolver<F>
where
    F: Fn(&Value, &Arguments, &RequestState, &Info<'_>) -> Result<Value, ResolverError>
        + Send
        + Sync,
{
    async fn resolve(
        &self,
        parent: &Value,
        arguments: &Arguments,
        state: &RequestState,
        info: &Info<'_>,
    ) -> Result<Value, ResolverError> {
        (self.0)(parent, arguments, state, info)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ResolverError {
    pub message: String,
    pub extensions: Option<BTreeMap<String, Value>>,
}

impl ResolverError {
    pub fn new(message: impl Into<String>) -> Self {
        ResolverError {
            message: message.into(),
            extensions: None,
        }
    }

    pub fn with_extension(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extensions
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(message) = payload.downcast_ref::<&str>() {
            message.to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "Resolver panicked".to_string()
        };

        ResolverError::new(message)
    }
}

impl From<&str> for ResolverError {
    fn from(message: &str) -> Self {
        ResolverError::new(message)
    }
}

impl From<String> for ResolverError {
    fn from(message: String) -> Self {
        ResolverError::new(message)
    }
}

/// Why a field produced no value.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error("{0}")]
    Resolver(#[from] ResolverError),
    #[error("Invalid value (value: {value}) for field `{field}` of type `{type_name}`")]
    InvalidValue {
        field: String,
        type_name: String,
        value: Value,
        reason: String,
    },
    #[error("Invalid value for argument `{argument}` of field `{field}`: {reason}")]
    InvalidArgument {
        field: String,
        argument: String,
        reason: String,
    },
}

/// Raw result of a resolver, before output coercion. Children resolve against it.
#[derive(Debug)]
pub enum RawOutcome {
    Resolved(Value),
    Failed(FieldError),
}

/// The interface an execution node drives. Implemented by baked field descriptors.
#[async_trait]
pub trait FieldExecutor: Send + Sync {
    /// Runs the resolver and coerces its result. Failures are reported through
    /// `RawOutcome::Failed` alongside a null coerced value.
    async fn invoke(
        &self,
        parent: &Value,
        arguments: &Arguments,
        state: &RequestState,
        info: &Info<'_>,
    ) -> (RawOutcome, ResponseValue);

    fn cant_be_null(&self) -> bool;

    fn contains_not_null(&self) -> bool;

    fn shall_produce_list(&self) -> bool;

    fn list_depth(&self) -> usize;
}
