use std::{fmt, sync::Arc};

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::{
    response::value::ResponseValue,
    schema::{error::SchemaError, scalars::ScalarType, type_ref::TypeRef},
};

/// Named types of a schema, by name.
pub type TypeMap = IndexMap<String, TypeDescriptor>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
}

impl TypeKind {
    /// Name used by introspection (`__TypeKind`).
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Scalar => "SCALAR",
            TypeKind::Object => "OBJECT",
            TypeKind::Interface => "INTERFACE",
            TypeKind::Union => "UNION",
            TypeKind::Enum => "ENUM",
            TypeKind::InputObject => "INPUT_OBJECT",
            TypeKind::List => "LIST",
            TypeKind::NonNull => "NON_NULL",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnumValue {
    pub description: Option<String>,
    pub deprecation_reason: Option<String>,
}

#[derive(Debug)]
pub struct EnumType {
    pub name: String,
    pub description: Option<String>,
    pub values: IndexMap<String, EnumValue>,
}

impl EnumType {
    pub fn new<V: Into<String>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        EnumType {
            name: name.into(),
            description: None,
            values: values
                .into_iter()
                .map(|value| (value.into(), EnumValue::default()))
                .collect(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn deprecate(mut self, value: &str, reason: impl Into<String>) -> Self {
        if let Some(enum_value) = self.values.get_mut(value) {
            enum_value.deprecation_reason = Some(reason.into());
        }
        self
    }
}

#[derive(Debug)]
pub struct ObjectType {
    pub name: String,
    pub description: Option<String>,
    pub interfaces: Vec<String>,
}

impl ObjectType {
    pub fn new(name: impl Into<String>) -> Self {
        ObjectType {
            name: name.into(),
            description: None,
            interfaces: vec![],
        }
    }

    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug)]
pub struct InterfaceType {
    pub name: String,
    pub description: Option<String>,
    pub interfaces: Vec<String>,
}

impl InterfaceType {
    pub fn new(name: impl Into<String>) -> Self {
        InterfaceType {
            name: name.into(),
            description: None,
            interfaces: vec![],
        }
    }

    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }
}

#[derive(Debug)]
pub struct UnionType {
    pub name: String,
    pub description: Option<String>,
    pub members: Vec<String>,
}

impl UnionType {
    pub fn new<M: Into<String>>(
        name: impl Into<String>,
        members: impl IntoIterator<Item = M>,
    ) -> Self {
        UnionType {
            name: name.into(),
            description: None,
            members: members.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug)]
pub struct InputValueDefinition {
    pub name: String,
    pub type_ref: TypeRef,
    pub default_value: Option<Value>,
    pub description: Option<String>,
}

#[derive(Debug)]
pub struct InputObjectType {
    pub name: String,
    pub description: Option<String>,
    pub fields: IndexMap<String, InputValueDefinition>,
}

impl InputObjectType {
    pub fn new(name: impl Into<String>) -> Self {
        InputObjectType {
            name: name.into(),
            description: None,
            fields: IndexMap::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, type_ref: TypeRef) -> Self {
        let name = name.into();
        self.fields.insert(
            name.clone(),
            InputValueDefinition {
                name,
                type_ref,
                default_value: None,
                description: None,
            },
        );
        self
    }

    pub fn field_with_default(
        mut self,
        name: impl Into<String>,
        type_ref: TypeRef,
        default_value: Value,
    ) -> Self {
        let name = name.into();
        self.fields.insert(
            name.clone(),
            InputValueDefinition {
                name,
                type_ref,
                default_value: Some(default_value),
                description: None,
            },
        );
        self
    }
}

/// A value that does not fit the type it is checked, coerced or collected against.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{reason}")]
pub struct InvalidValue {
    pub value: Value,
    pub reason: String,
}

impl InvalidValue {
    fn new(value: &Value, reason: impl Into<String>) -> Self {
        InvalidValue {
            value: value.clone(),
            reason: reason.into(),
        }
    }
}

/// A resolved type: a shared named type, or a `List`/`NonNull` wrapper around another descriptor.
#[derive(Clone, Debug)]
pub enum TypeDescriptor {
    Scalar(Arc<ScalarType>),
    Enum(Arc<EnumType>),
    Object(Arc<ObjectType>),
    Interface(Arc<InterfaceType>),
    Union(Arc<UnionType>),
    InputObject(Arc<InputObjectType>),
    List(Box<TypeDescriptor>),
    NonNull(Box<TypeDescriptor>),
}

impl TypeDescriptor {
    /// Resolves a type reference against the named types. `referenced_by` only names the
    /// referencing definition in errors.
    pub fn resolve(
        type_ref: &TypeRef,
        types: &TypeMap,
        referenced_by: &str,
    ) -> Result<TypeDescriptor, SchemaError> {
        match type_ref {
            TypeRef::Named(name) => {
                types
                    .get(name)
                    .cloned()
                    .ok_or_else(|| SchemaError::UnknownType {
                        referenced_by: referenced_by.to_string(),
                        type_name: name.clone(),
                    })
            }
            TypeRef::List(inner) => Ok(TypeDescriptor::List(Box::new(TypeDescriptor::resolve(
                inner,
                types,
                referenced_by,
            )?))),
            TypeRef::NonNull(inner) => {
                if inner.is_non_null() {
                    return Err(SchemaError::NestedNonNull {
                        referenced_by: referenced_by.to_string(),
                        type_syntax: type_ref.to_string(),
                    });
                }
                Ok(TypeDescriptor::NonNull(Box::new(TypeDescriptor::resolve(
                    inner,
                    types,
                    referenced_by,
                )?)))
            }
        }
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            TypeDescriptor::Scalar(_) => TypeKind::Scalar,
            TypeDescriptor::Enum(_) => TypeKind::Enum,
            TypeDescriptor::Object(_) => TypeKind::Object,
            TypeDescriptor::Interface(_) => TypeKind::Interface,
            TypeDescriptor::Union(_) => TypeKind::Union,
            TypeDescriptor::InputObject(_) => TypeKind::InputObject,
            TypeDescriptor::List(_) => TypeKind::List,
            TypeDescriptor::NonNull(_) => TypeKind::NonNull,
        }
    }

    /// Name of a named type. Wrappers have none.
    pub fn name(&self) -> Option<&str> {
        match self {
            TypeDescriptor::Scalar(t) => Some(&t.name),
            TypeDescriptor::Enum(t) => Some(&t.name),
            TypeDescriptor::Object(t) => Some(&t.name),
            TypeDescriptor::Interface(t) => Some(&t.name),
            TypeDescriptor::Union(t) => Some(&t.name),
            TypeDescriptor::InputObject(t) => Some(&t.name),
            TypeDescriptor::List(_) | TypeDescriptor::NonNull(_) => None,
        }
    }

    pub fn of_type(&self) -> Option<&TypeDescriptor> {
        match self {
            TypeDescriptor::List(inner) | TypeDescriptor::NonNull(inner) => Some(inner),
            _ => None,
        }
    }

    /// The named type under every wrapper.
    pub fn named_type(&self) -> &TypeDescriptor {
        match self {
            TypeDescriptor::List(inner) | TypeDescriptor::NonNull(inner) => inner.named_type(),
            named => named,
        }
    }

    pub fn named_type_name(&self) -> &str {
        self.named_type().name().unwrap_or_default()
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeDescriptor::NonNull(_))
    }

    /// A list once the outermost non-null is stripped.
    pub fn is_list(&self) -> bool {
        match self {
            TypeDescriptor::NonNull(inner) => inner.is_list(),
            TypeDescriptor::List(_) => true,
            _ => false,
        }
    }

    pub fn list_depth(&self) -> usize {
        match self {
            TypeDescriptor::List(inner) => 1 + inner.list_depth(),
            TypeDescriptor::NonNull(inner) => inner.list_depth(),
            _ => 0,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(
            self.named_type(),
            TypeDescriptor::Scalar(_) | TypeDescriptor::Enum(_)
        )
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.named_type(), TypeDescriptor::Enum(_))
    }

    pub fn is_composite(&self) -> bool {
        matches!(
            self.named_type(),
            TypeDescriptor::Object(_) | TypeDescriptor::Interface(_) | TypeDescriptor::Union(_)
        )
    }

    pub fn is_abstract(&self) -> bool {
        matches!(
            self.named_type(),
            TypeDescriptor::Interface(_) | TypeDescriptor::Union(_)
        )
    }

    pub fn is_input_type(&self) -> bool {
        matches!(
            self.named_type(),
            TypeDescriptor::Scalar(_) | TypeDescriptor::Enum(_) | TypeDescriptor::InputObject(_)
        )
    }

    pub fn is_output_type(&self) -> bool {
        !matches!(self.named_type(), TypeDescriptor::InputObject(_))
    }

    /// Checks that a resolved value fits this type without producing anything.
    pub fn type_check(&self, value: &Value) -> Result<(), InvalidValue> {
        match self {
            TypeDescriptor::NonNull(inner) => {
                if value.is_null() {
                    return Err(InvalidValue::new(
                        value,
                        format!("Expected a non-null value of type `{}`", self),
                    ));
                }
                inner.type_check(value)
            }
            _ if value.is_null() => Ok(()),
            TypeDescriptor::List(inner) => match value {
                Value::Array(items) => items.iter().try_for_each(|item| inner.type_check(item)),
                _ => Err(InvalidValue::new(value, format!("Expected a list for type `{}`", self))),
            },
            _ => self.collect_value(value).map(|_| ()),
        }
    }

    /// Input coercion of argument and input object values.
    pub fn coerce_value(&self, value: &Value, types: &TypeMap) -> Result<Value, InvalidValue> {
        match self {
            TypeDescriptor::NonNull(inner) => {
                if value.is_null() {
                    return Err(InvalidValue::new(
                        value,
                        format!("Expected a non-null value of type `{}`", self),
                    ));
                }
                inner.coerce_value(value, types)
            }
            _ if value.is_null() => Ok(Value::Null),
            TypeDescriptor::List(inner) => match value {
                Value::Array(items) => items
                    .iter()
                    .map(|item| inner.coerce_value(item, types))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array),
                single => Ok(Value::Array(vec![inner.coerce_value(single, types)?])),
            },
            TypeDescriptor::Scalar(scalar) => scalar
                .coercer()
                .coerce_input(value)
                .map_err(|reason| InvalidValue::new(value, reason)),
            TypeDescriptor::Enum(enum_type) => match value {
                Value::String(name) if enum_type.values.contains_key(name) => Ok(value.clone()),
                _ => Err(InvalidValue::new(
                    value,
                    format!("Value is not a member of enum `{}`", enum_type.name),
                )),
            },
            TypeDescriptor::InputObject(input_type) => {
                coerce_input_object(input_type, value, types)
            }
            TypeDescriptor::Object(_) | TypeDescriptor::Interface(_) | TypeDescriptor::Union(_) => {
                Err(InvalidValue::new(value, format!("`{}` is not an input type", self)))
            }
        }
    }

    /// Output coercion of a resolved value into the shape written to the response document.
    /// Composite values become empty objects filled by child fields.
    pub fn collect_value(&self, value: &Value) -> Result<ResponseValue, InvalidValue> {
        match self {
            TypeDescriptor::NonNull(inner) => {
                let collected = inner.collect_value(value)?;
                if collected.is_null() {
                    return Err(InvalidValue::new(
                        value,
                        format!("Cannot return null for non-nullable type `{}`", self),
                    ));
                }
                Ok(collected)
            }
            _ if value.is_null() => Ok(ResponseValue::Null),
            TypeDescriptor::List(inner) => match value {
                Value::Array(items) => items
                    .iter()
                    .map(|item| inner.collect_value(item))
                    .collect::<Result<Vec<_>, _>>()
                    .map(ResponseValue::List),
                _ => Err(InvalidValue::new(value, format!("Expected a list for type `{}`", self))),
            },
            TypeDescriptor::Scalar(scalar) => scalar
                .coercer()
                .coerce_output(value)
                .map(ResponseValue::Leaf)
                .map_err(|reason| InvalidValue::new(value, reason)),
            TypeDescriptor::Enum(enum_type) => match value {
                Value::String(name) if enum_type.values.contains_key(name) => {
                    Ok(ResponseValue::Leaf(value.clone()))
                }
                _ => Err(InvalidValue::new(
                    value,
                    format!("Value is not a member of enum `{}`", enum_type.name),
                )),
            },
            TypeDescriptor::Object(_) | TypeDescriptor::Interface(_) | TypeDescriptor::Union(_) => {
                match value {
                    Value::Object(_) => Ok(ResponseValue::empty_object()),
                    _ => Err(InvalidValue::new(
                        value,
                        format!("Expected an object for type `{}`", self),
                    )),
                }
            }
            TypeDescriptor::InputObject(_) => {
                Err(InvalidValue::new(value, format!("`{}` is not an output type", self)))
            }
        }
    }
}

fn coerce_input_object(
    input_type: &InputObjectType,
    value: &Value,
    types: &TypeMap,
) -> Result<Value, InvalidValue> {
    let Value::Object(provided) = value else {
        return Err(InvalidValue::new(
            value,
            format!("Expected an object for input type `{}`", input_type.name),
        ));
    };

    if let Some(unknown) = provided
        .keys()
        .find(|key| !input_type.fields.contains_key(key.as_str()))
    {
        return Err(InvalidValue::new(
            value,
            format!("Field `{}` is not defined by type `{}`", unknown, input_type.name),
        ));
    }

    let mut coerced = Map::with_capacity(input_type.fields.len());
    for (name, definition) in &input_type.fields {
        let field_type = TypeDescriptor::resolve(&definition.type_ref, types, &input_type.name)
            .map_err(|err| InvalidValue::new(value, err.to_string()))?;

        match (provided.get(name), &definition.default_value) {
            (Some(field_value), _) => {
                coerced.insert(name.clone(), field_type.coerce_value(field_value, types)?);
            }
            (None, Some(default_value)) => {
                coerced.insert(name.clone(), default_value.clone());
            }
            (None, None) if field_type.is_non_null() => {
                return Err(InvalidValue::new(
                    value,
                    format!(
                        "Field `{}` of required type `{}` was not provided",
                        name, field_type
                    ),
                ));
            }
            (None, None) => {}
        }
    }

    Ok(Value::Object(coerced))
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::List(inner) => write!(f, "[{}]", inner),
            TypeDescriptor::NonNull(inner) => write!(f, "{}!", inner),
            named => f.write_str(named.name().unwrap_or_default()),
        }
    }
}
