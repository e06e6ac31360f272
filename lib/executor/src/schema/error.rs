use crate::schema::type_ref::TypeRefParseError;

/// Problems found while baking a schema. A schema that fails to bake never executes anything.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Type '{0}' is defined more than once")]
    DuplicateType(String),
    #[error("Field '{field}' is defined more than once on type '{type_name}'")]
    DuplicateField { type_name: String, field: String },
    #[error("Type '{type_name}' referenced by '{referenced_by}' does not exist")]
    UnknownType {
        referenced_by: String,
        type_name: String,
    },
    #[error("Type '{type_syntax}' used by '{referenced_by}' wraps a non-null type in another non-null")]
    NestedNonNull {
        referenced_by: String,
        type_syntax: String,
    },
    #[error("Invalid type reference on '{referenced_by}': {source}")]
    InvalidTypeRef {
        referenced_by: String,
        source: TypeRefParseError,
    },
    #[error("'{referenced_by}' must be an output type but '{type_name}' is an input object")]
    OutputTypeExpected {
        referenced_by: String,
        type_name: String,
    },
    #[error("'{referenced_by}' must be an input type but '{type_name}' is a composite type")]
    InputTypeExpected {
        referenced_by: String,
        type_name: String,
    },
    #[error("Directive '@{directive}' used on '{referenced_by}' is not registered")]
    UnknownDirective {
        referenced_by: String,
        directive: String,
    },
    #[error("Invalid default value for '{referenced_by}': {reason}")]
    InvalidDefaultValue {
        referenced_by: String,
        reason: String,
    },
    #[error("Schema has no query root type '{0}'")]
    MissingQueryType(String),
    #[error("Schema has no mutation root type '{0}'")]
    MissingMutationType(String),
    #[error("Root type '{0}' must be an object type")]
    RootTypeNotObject(String),
    #[error("Member '{member}' of union '{union_name}' must be an object type")]
    UnionMemberNotObject { union_name: String, member: String },
    #[error("Type '{type_name}' implements '{interface}' which is not an interface")]
    UnknownInterface { type_name: String, interface: String },
}
