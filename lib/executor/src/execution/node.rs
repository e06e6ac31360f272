use std::{fmt, sync::Arc};

use crate::{
    execution::{
        compile::OperationKind,
        error::{CompileError, ExecutionError},
    },
    response::graphql_error::{Location, PathSegment, ResponsePath},
    schema::{directives::Arguments, field::FieldDescriptor},
};

/// Index of a node in its [`ExecutionTree`]. Identifies a node for the lifetime of a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<usize> for NodeId {
    type Error = CompileError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        u32::try_from(index)
            .map(NodeId)
            .map_err(|_| CompileError::TooManyNodes(index))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One selected field of the operation, bound to its baked field descriptor.
#[derive(Debug)]
pub struct ExecutionNode {
    pub id: NodeId,
    pub name: String,
    pub response_key: String,
    /// Response keys from the root down to this node, without list indices.
    pub path: Vec<String>,
    pub location: Location,
    pub type_condition: Option<String>,
    pub arguments: Arguments,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    pub field: Arc<FieldDescriptor>,
}

/// Arena of execution nodes built once per request. Parents are referenced by index, so
/// bubbling can walk upwards without the nodes owning each other.
#[derive(Debug)]
pub struct ExecutionTree {
    pub operation_kind: OperationKind,
    pub root_type: String,
    pub(crate) nodes: Vec<ExecutionNode>,
    pub(crate) roots: Vec<NodeId>,
}

impl ExecutionTree {
    pub fn node(&self, id: NodeId) -> Result<&ExecutionNode, ExecutionError> {
        self.nodes
            .get(id.index())
            .ok_or(ExecutionError::UnknownNode(id))
    }

    pub fn nodes(&self) -> &[ExecutionNode] {
        &self.nodes
    }

    pub fn roots(&self) -> impl Iterator<Item = &ExecutionNode> {
        self.roots.iter().filter_map(|id| self.nodes.get(id.index()))
    }

    /// Ancestors of `id`, nearest first. The node itself is not included.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = &ExecutionNode> {
        let parent_of =
            |node: &ExecutionNode| node.parent.and_then(|parent| self.nodes.get(parent.index()));
        let first = self.nodes.get(id.index()).and_then(parent_of);
        std::iter::successors(first, move |node| parent_of(node))
    }

    /// Cuts the runtime `path` of a descendant down to the slot of `ancestor` it passes
    /// through. Every node above the ancestor owns its key segment plus one index segment per
    /// list layer of its type.
    pub fn slot_path(
        &self,
        ancestor: NodeId,
        path: &ResponsePath,
    ) -> Result<ResponsePath, ExecutionError> {
        let mismatch = || ExecutionError::PathMismatch {
            node: ancestor,
            path: path.clone(),
        };

        let target = self.node(ancestor)?;
        let mut lineage: Vec<&ExecutionNode> = self.ancestors(ancestor).collect();
        lineage.reverse();

        let segments = path.segments();
        let mut cursor = 0;

        for node in &lineage {
            match segments.get(cursor) {
                Some(PathSegment::Field(key)) if *key == node.response_key => cursor += 1,
                _ => return Err(mismatch()),
            }
            for _ in 0..node.field.list_depth {
                match segments.get(cursor) {
                    Some(PathSegment::Index(_)) => cursor += 1,
                    _ => return Err(mismatch()),
                }
            }
        }

        match segments.get(cursor) {
            Some(PathSegment::Field(key)) if *key == target.response_key => cursor += 1,
            _ => return Err(mismatch()),
        }

        Ok(ResponsePath::from(segments[..cursor].to_vec()))
    }
}
