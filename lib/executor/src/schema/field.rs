use std::{panic::AssertUnwindSafe, sync::Arc};

use async_trait::async_trait;
use futures::FutureExt;
use indexmap::IndexMap;
use serde_json::Value;

use crate::{
    request_state::RequestState,
    resolver::{
        FieldError, FieldExecutor, Info, RawOutcome, Resolver, ResolverError, TypenameResolver,
    },
    response::value::ResponseValue,
    schema::{
        directives::{
            deprecation_reason, Arguments, DirectivePipeline, DirectiveRegistry, DirectiveUse,
            FieldIntrospection,
        },
        error::SchemaError,
        type_ref::{TypeRef, TypeRefParseError},
        types::{TypeDescriptor, TypeMap},
    },
};

/// A declared type, either as GraphQL type syntax or as an already built reference.
#[derive(Clone, Debug, PartialEq)]
pub enum DeclaredType {
    Syntax(String),
    Ref(TypeRef),
}

impl DeclaredType {
    pub fn type_ref(&self) -> Result<TypeRef, TypeRefParseError> {
        match self {
            DeclaredType::Syntax(syntax) => TypeRef::parse(syntax),
            DeclaredType::Ref(type_ref) => Ok(type_ref.clone()),
        }
    }
}

impl From<&str> for DeclaredType {
    fn from(value: &str) -> Self {
        DeclaredType::Syntax(value.to_string())
    }
}

impl From<String> for DeclaredType {
    fn from(value: String) -> Self {
        DeclaredType::Syntax(value)
    }
}

impl From<TypeRef> for DeclaredType {
    fn from(value: TypeRef) -> Self {
        DeclaredType::Ref(value)
    }
}

pub struct ArgumentDefinition {
    pub name: String,
    pub declared_type: DeclaredType,
    pub default_value: Option<Value>,
    pub description: Option<String>,
}

impl ArgumentDefinition {
    pub fn new(name: impl Into<String>, declared_type: impl Into<DeclaredType>) -> Self {
        ArgumentDefinition {
            name: name.into(),
            declared_type: declared_type.into(),
            default_value: None,
            description: None,
        }
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A field as declared on an object or interface, before baking.
pub struct FieldDefinition {
    pub name: String,
    pub declared_type: DeclaredType,
    pub arguments: Vec<ArgumentDefinition>,
    pub resolver: Option<Arc<dyn Resolver>>,
    pub description: Option<String>,
    pub directives: Vec<DirectiveUse>,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, declared_type: impl Into<DeclaredType>) -> Self {
        FieldDefinition {
            name: name.into(),
            declared_type: declared_type.into(),
            arguments: vec![],
            resolver: None,
            description: None,
            directives: vec![],
        }
    }

    pub fn argument(mut self, argument: ArgumentDefinition) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn resolver(mut self, resolver: impl Resolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn directive(mut self, directive: DirectiveUse) -> Self {
        self.directives.push(directive);
        self
    }

    pub(crate) fn typename() -> Self {
        FieldDefinition::new(
            "__typename",
            TypeRef::non_null(TypeRef::named("String")),
        )
        .resolver(TypenameResolver)
    }
}

#[derive(Debug)]
pub struct ArgumentDescriptor {
    pub name: String,
    pub argument_type: TypeDescriptor,
    pub default_value: Option<Value>,
    pub description: Option<String>,
}

pub(crate) struct BakeContext<'a> {
    pub types: &'a TypeMap,
    pub directives: &'a DirectiveRegistry,
    pub default_resolver: &'a Arc<dyn Resolver>,
}

/// A baked field: resolved types, nullability flags, directive hooks and the bound resolver.
/// Shared by every execution node selecting the field.
pub struct FieldDescriptor {
    pub name: String,
    pub parent_type: String,
    pub description: Option<String>,
    pub deprecation_reason: Option<String>,
    pub declared_type: TypeRef,
    pub field_type: TypeDescriptor,
    pub reduced_type: TypeDescriptor,
    pub arguments: IndexMap<String, ArgumentDescriptor>,
    pub is_leaf: bool,
    pub is_enum: bool,
    pub cant_be_null: bool,
    pub contains_not_null: bool,
    pub shall_produce_list: bool,
    pub list_depth: usize,
    pub directives: DirectivePipeline,
    resolver: Arc<dyn Resolver>,
}

impl std::fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("parent_type", &self.parent_type)
            .field("field_type", &self.field_type.to_string())
            .field("directives", &self.directives)
            .finish()
    }
}

impl FieldDescriptor {
    pub(crate) fn bake(
        definition: FieldDefinition,
        parent_type: &str,
        ctx: &BakeContext<'_>,
    ) -> Result<Self, SchemaError> {
        let coordinate = format!("{}.{}", parent_type, definition.name);

        let declared_type =
            definition
                .declared_type
                .type_ref()
                .map_err(|source| SchemaError::InvalidTypeRef {
                    referenced_by: coordinate.clone(),
                    source,
                })?;
        let field_type = TypeDescriptor::resolve(&declared_type, ctx.types, &coordinate)?;
        if !field_type.is_output_type() {
            return Err(SchemaError::OutputTypeExpected {
                referenced_by: coordinate,
                type_name: field_type.named_type_name().to_string(),
            });
        }

        let mut arguments = IndexMap::with_capacity(definition.arguments.len());
        for argument in definition.arguments {
            let argument_coordinate = format!("{}({}:)", coordinate, argument.name);
            let type_ref = argument.declared_type.type_ref().map_err(|source| {
                SchemaError::InvalidTypeRef {
                    referenced_by: argument_coordinate.clone(),
                    source,
                }
            })?;
            let argument_type =
                TypeDescriptor::resolve(&type_ref, ctx.types, &argument_coordinate)?;
            if !argument_type.is_input_type() {
                return Err(SchemaError::InputTypeExpected {
                    referenced_by: argument_coordinate,
                    type_name: argument_type.named_type_name().to_string(),
                });
            }
            if let Some(default_value) = &argument.default_value {
                argument_type
                    .coerce_value(default_value, ctx.types)
                    .map_err(|err| SchemaError::InvalidDefaultValue {
                        referenced_by: argument_coordinate.clone(),
                        reason: err.reason,
                    })?;
            }

            arguments.insert(
                argument.name.clone(),
                ArgumentDescriptor {
                    name: argument.name,
                    argument_type,
                    default_value: argument.default_value,
                    description: argument.description,
                },
            );
        }

        let directives =
            DirectivePipeline::bake(&definition.directives, ctx.directives, &coordinate)?;
        let deprecation_reason = directives.arguments_of("deprecated").map(deprecation_reason);

        Ok(FieldDescriptor {
            name: definition.name,
            parent_type: parent_type.to_string(),
            description: definition.description,
            deprecation_reason,
            reduced_type: field_type.named_type().clone(),
            is_leaf: field_type.is_leaf(),
            is_enum: field_type.is_enum(),
            cant_be_null: field_type.is_non_null(),
            contains_not_null: contains_not_null(&field_type),
            shall_produce_list: field_type.is_list(),
            list_depth: field_type.list_depth(),
            declared_type,
            field_type,
            arguments,
            directives,
            resolver: definition
                .resolver
                .unwrap_or_else(|| ctx.default_resolver.clone()),
        })
    }

    /// Applies declared defaults and input coercion to the arguments of a selection.
    pub fn coerce_arguments(
        &self,
        provided: &Arguments,
        types: &TypeMap,
    ) -> Result<Arguments, FieldError> {
        if let Some(unknown) = provided
            .keys()
            .find(|name| !self.arguments.contains_key(name.as_str()))
        {
            return Err(FieldError::InvalidArgument {
                field: self.name.clone(),
                argument: unknown.clone(),
                reason: "Unknown argument".to_string(),
            });
        }

        let mut coerced = Arguments::with_capacity(self.arguments.len());
        for (name, argument) in &self.arguments {
            let value = match (provided.get(name), &argument.default_value) {
                (Some(value), _) => argument
                    .argument_type
                    .coerce_value(value, types)
                    .map_err(|err| FieldError::InvalidArgument {
                        field: self.name.clone(),
                        argument: name.clone(),
                        reason: err.reason,
                    })?,
                (None, Some(default_value)) => default_value.clone(),
                (None, None) if argument.argument_type.is_non_null() => {
                    return Err(FieldError::InvalidArgument {
                        field: self.name.clone(),
                        argument: name.clone(),
                        reason: format!(
                            "Argument of required type `{}` was not provided",
                            argument.argument_type
                        ),
                    });
                }
                (None, None) => continue,
            };
            coerced.insert(name.clone(), value);
        }

        Ok(coerced)
    }

    /// Introspection view of the field after its `on_introspection` hooks. `None` hides it.
    pub fn introspect(&self) -> Option<FieldIntrospection> {
        self.directives.introspect(FieldIntrospection {
            name: self.name.clone(),
            description: self.description.clone(),
            type_name: self.field_type.to_string(),
            is_deprecated: false,
            deprecation_reason: None,
        })
    }

    async fn resolve_raw(
        &self,
        parent: &Value,
        arguments: &Arguments,
        state: &RequestState,
        info: &Info<'_>,
    ) -> Result<Value, FieldError> {
        let arguments = self.coerce_arguments(arguments, info.schema.types())?;
        let call = self.resolver.resolve(parent, &arguments, state, info);

        let value = if info.context.config.catch_resolver_panics {
            AssertUnwindSafe(call)
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| Err(ResolverError::from_panic(payload)))?
        } else {
            call.await?
        };

        Ok(self.directives.pre_output_coercion(value, self)?)
    }
}

#[async_trait]
impl FieldExecutor for FieldDescriptor {
    async fn invoke(
        &self,
        parent: &Value,
        arguments: &Arguments,
        state: &RequestState,
        info: &Info<'_>,
    ) -> (RawOutcome, ResponseValue) {
        let resolved = match self.resolve_raw(parent, arguments, state, info).await {
            Ok(value) => value,
            Err(error) => return (RawOutcome::Failed(error), ResponseValue::Null),
        };

        match self.field_type.collect_value(&resolved) {
            Ok(coerced) => (RawOutcome::Resolved(resolved), coerced),
            Err(invalid) => (
                RawOutcome::Failed(FieldError::InvalidValue {
                    field: self.name.clone(),
                    type_name: self.field_type.to_string(),
                    value: invalid.value,
                    reason: invalid.reason,
                }),
                ResponseValue::Null,
            ),
        }
    }

    fn cant_be_null(&self) -> bool {
        self.cant_be_null
    }

    fn contains_not_null(&self) -> bool {
        self.contains_not_null
    }

    fn shall_produce_list(&self) -> bool {
        self.shall_produce_list
    }

    fn list_depth(&self) -> usize {
        self.list_depth
    }
}

/// True when any wrapper layer of the type, the outermost included, is non-null.
fn contains_not_null(field_type: &TypeDescriptor) -> bool {
    match field_type {
        TypeDescriptor::NonNull(_) => true,
        TypeDescriptor::List(inner) => contains_not_null(inner),
        _ => false,
    }
}
