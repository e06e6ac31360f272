use std::{collections::HashMap, sync::Arc};

use indexmap::IndexMap;
use serde_json::Value;

use crate::{
    resolver::ResolverError,
    schema::{error::SchemaError, field::FieldDescriptor},
};

pub type Arguments = IndexMap<String, Value>;

pub const DEFAULT_DEPRECATION_REASON: &str = "No longer supported";

/// What introspection reports about a field. Directive hooks may rewrite it or hide the field.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldIntrospection {
    pub name: String,
    pub description: Option<String>,
    pub type_name: String,
    pub is_deprecated: bool,
    pub deprecation_reason: Option<String>,
}

/// Behaviour attached to a directive. Every hook defaults to passing its input through.
pub trait DirectiveHook: Send + Sync {
    fn on_pre_output_coercion(
        &self,
        _arguments: &Arguments,
        value: Value,
        _field: &FieldDescriptor,
    ) -> Result<Value, ResolverError> {
        Ok(value)
    }

    fn on_introspection(
        &self,
        _arguments: &Arguments,
        field: FieldIntrospection,
    ) -> Option<FieldIntrospection> {
        Some(field)
    }
}

/// A directive applied to a field definition.
#[derive(Clone, Debug, PartialEq)]
pub struct DirectiveUse {
    pub name: String,
    pub arguments: Arguments,
}

impl DirectiveUse {
    pub fn new(name: impl Into<String>) -> Self {
        DirectiveUse {
            name: name.into(),
            arguments: Arguments::new(),
        }
    }

    pub fn argument(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }
}

pub type DirectiveRegistry = HashMap<String, Arc<dyn DirectiveHook>>;

struct BoundDirective {
    name: String,
    hook: Arc<dyn DirectiveHook>,
    arguments: Arguments,
}

/// Directive hooks of a field in declaration order, fixed at bake time.
#[derive(Clone, Default)]
pub struct DirectivePipeline {
    hooks: Arc<Vec<BoundDirective>>,
}

impl DirectivePipeline {
    pub(crate) fn bake(
        uses: &[DirectiveUse],
        registry: &DirectiveRegistry,
        referenced_by: &str,
    ) -> Result<Self, SchemaError> {
        let hooks = uses
            .iter()
            .map(|directive| {
                registry
                    .get(&directive.name)
                    .map(|hook| BoundDirective {
                        name: directive.name.clone(),
                        hook: hook.clone(),
                        arguments: directive.arguments.clone(),
                    })
                    .ok_or_else(|| SchemaError::UnknownDirective {
                        referenced_by: referenced_by.to_string(),
                        directive: directive.name.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DirectivePipeline {
            hooks: Arc::new(hooks),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.hooks.iter().map(|bound| bound.name.as_str())
    }

    pub fn arguments_of(&self, name: &str) -> Option<&Arguments> {
        self.hooks
            .iter()
            .find(|bound| bound.name == name)
            .map(|bound| &bound.arguments)
    }

    pub fn pre_output_coercion(
        &self,
        value: Value,
        field: &FieldDescriptor,
    ) -> Result<Value, ResolverError> {
        self.hooks.iter().try_fold(value, |value, bound| {
            bound.hook.on_pre_output_coercion(&bound.arguments, value, field)
        })
    }

    pub fn introspect(&self, field: FieldIntrospection) -> Option<FieldIntrospection> {
        self.hooks.iter().try_fold(field, |field, bound| {
            bound.hook.on_introspection(&bound.arguments, field)
        })
    }
}

impl std::fmt::Debug for DirectivePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// `@deprecated(reason: String)`
pub struct Deprecated;

impl DirectiveHook for Deprecated {
    fn on_introspection(
        &self,
        arguments: &Arguments,
        mut field: FieldIntrospection,
    ) -> Option<FieldIntrospection> {
        field.is_deprecated = true;
        field.deprecation_reason = Some(deprecation_reason(arguments));
        Some(field)
    }
}

pub(crate) fn deprecation_reason(arguments: &Arguments) -> String {
    arguments
        .get("reason")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_DEPRECATION_REASON)
        .to_string()
}

/// `@nonIntrospectable`: the field executes but is hidden from introspection.
pub struct NonIntrospectable;

impl DirectiveHook for NonIntrospectable {
    fn on_introspection(
        &self,
        _arguments: &Arguments,
        _field: FieldIntrospection,
    ) -> Option<FieldIntrospection> {
        None
    }
}

pub fn builtin_directives() -> DirectiveRegistry {
    let mut registry: DirectiveRegistry = HashMap::new();
    registry.insert("deprecated".to_string(), Arc::new(Deprecated));
    registry.insert("nonIntrospectable".to_string(), Arc::new(NonIntrospectable));
    registry
}
