use crate::{execution::node::NodeId, response::graphql_error::ResponsePath};

/// Faults of the orchestration layer itself. Unlike field errors these are never turned into
/// data: any of them aborts the whole request.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ExecutionError {
    #[error("Result slot '{0}' does not exist")]
    MissingSlot(ResponsePath),
    #[error("Result slot '{0}' does not have the expected shape")]
    SlotShapeMismatch(ResponsePath),
    #[error("Lock guarding the {0} was poisoned")]
    PoisonedLock(&'static str),
    #[error("Field '{field}' produces a list but its value at '{path}' is not a list")]
    ListShapeMismatch { field: String, path: ResponsePath },
    #[error("Execution node {0} does not exist")]
    UnknownNode(NodeId),
    #[error("Path '{path}' does not pass through node {node}")]
    PathMismatch { node: NodeId, path: ResponsePath },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Schema does not define a {0} root type")]
    MissingRootType(&'static str),
    #[error("Type '{0}' does not exist in the schema")]
    UnknownType(String),
    #[error("Field '{field}' does not exist on type '{type_name}'")]
    UnknownField { type_name: String, field: String },
    #[error("Field '{field}' of type '{type_name}' is a leaf and cannot have a selection set")]
    SelectionOnLeaf { type_name: String, field: String },
    #[error("Field '{field}' of type '{type_name}' must have a selection set")]
    MissingSelection { type_name: String, field: String },
    #[error("Operation needs {0} execution nodes, more than a tree can address")]
    TooManyNodes(usize),
}

/// Everything that can prevent a request from producing a response.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RequestError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}
