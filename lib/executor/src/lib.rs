pub mod context;
pub mod execution;
pub mod request_state;
pub mod resolver;
pub mod response;
pub mod schema;

#[cfg(test)]
mod tests;

pub use execution::{
    compile::{InputValue, Operation, OperationKind, Selection, Variables},
    error::{CompileError, ExecutionError, RequestError},
    executor::{execute, execute_operation},
    node::{ExecutionNode, ExecutionTree, NodeId},
};
pub use request_state::RequestState;
pub use resolver::{resolver_fn, FieldError, FieldExecutor, Info, Resolver, ResolverError};
pub use response::{
    graphql_error::{GraphQLError, Location, PathSegment, ResponsePath},
    response::ExecutionResponse,
};
pub use schema::{
    builder::SchemaBuilder,
    error::SchemaError,
    field::{ArgumentDefinition, FieldDefinition},
    type_ref::TypeRef,
    types::{
        EnumType, InputObjectType, InterfaceType, ObjectType, TypeDescriptor, TypeKind, UnionType,
    },
    Schema,
};
