use std::collections::HashMap;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::trace;

use crate::{
    execution::{
        error::CompileError,
        node::{ExecutionNode, ExecutionTree, NodeId},
    },
    response::graphql_error::Location,
    schema::{directives::Arguments, Schema},
};

pub type Variables = HashMap<String, Value>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Query,
    Mutation,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
        }
    }
}

/// An argument value of a selection: a literal, or a reference to a request variable.
#[derive(Clone, Debug, PartialEq)]
pub enum InputValue {
    Literal(Value),
    Variable(String),
    List(Vec<InputValue>),
    Object(IndexMap<String, InputValue>),
}

impl InputValue {
    pub fn literal(value: impl Into<Value>) -> Self {
        InputValue::Literal(value.into())
    }

    pub fn variable(name: impl Into<String>) -> Self {
        InputValue::Variable(name.into())
    }

    /// Variables without a value resolve to `null`.
    fn resolve(&self, variables: &Variables) -> Value {
        match self {
            InputValue::Literal(value) => value.clone(),
            InputValue::Variable(name) => variables.get(name).cloned().unwrap_or(Value::Null),
            InputValue::List(items) => {
                Value::Array(items.iter().map(|item| item.resolve(variables)).collect())
            }
            InputValue::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value.resolve(variables)))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }
}

/// A field selection of an already parsed operation. Fragments are expressed through
/// `type_condition`.
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    pub name: String,
    pub alias: Option<String>,
    pub arguments: IndexMap<String, InputValue>,
    pub selections: Vec<Selection>,
    pub location: Location,
    pub type_condition: Option<String>,
}

impl Selection {
    pub fn field(name: impl Into<String>) -> Self {
        Selection {
            name: name.into(),
            alias: None,
            arguments: IndexMap::new(),
            selections: vec![],
            location: Location::default(),
            type_condition: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn argument(mut self, name: impl Into<String>, value: InputValue) -> Self {
        self.arguments.insert(name.into(), value);
        self
    }

    pub fn select(mut self, selections: impl IntoIterator<Item = Selection>) -> Self {
        self.selections.extend(selections);
        self
    }

    pub fn on(mut self, type_condition: impl Into<String>) -> Self {
        self.type_condition = Some(type_condition.into());
        self
    }

    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.location = Location::new(line, column);
        self
    }

    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Operation {
    pub kind: OperationKind,
    pub selections: Vec<Selection>,
}

impl Operation {
    pub fn query(selections: impl IntoIterator<Item = Selection>) -> Self {
        Operation {
            kind: OperationKind::Query,
            selections: selections.into_iter().collect(),
        }
    }

    pub fn mutation(selections: impl IntoIterator<Item = Selection>) -> Self {
        Operation {
            kind: OperationKind::Mutation,
            selections: selections.into_iter().collect(),
        }
    }
}

/// Selections sharing a response key and a type condition, executed as a single node.
struct MergedSelection<'s> {
    first: &'s Selection,
    members: Vec<&'s Selection>,
}

fn merge_selections<'s>(
    selections: impl IntoIterator<Item = &'s Selection>,
) -> Vec<MergedSelection<'s>> {
    let mut merged: IndexMap<(&'s str, Option<&'s str>), MergedSelection<'s>> = IndexMap::new();

    for selection in selections {
        merged
            .entry((selection.response_key(), selection.type_condition.as_deref()))
            .or_insert_with(|| MergedSelection {
                first: selection,
                members: vec![],
            })
            .members
            .push(selection);
    }

    merged.into_values().collect()
}

struct TreeCompiler<'a> {
    schema: &'a Schema,
    variables: &'a Variables,
    nodes: Vec<ExecutionNode>,
}

impl<'a> TreeCompiler<'a> {
    fn compile_selection(
        &mut self,
        parent_type: &str,
        parent: Option<NodeId>,
        parent_path: &[String],
        merged: MergedSelection<'_>,
    ) -> Result<NodeId, CompileError> {
        let selection = merged.first;
        let lookup_type = match &selection.type_condition {
            Some(condition) => {
                if self.schema.find_type(condition).is_none() {
                    return Err(CompileError::UnknownType(condition.clone()));
                }
                condition.as_str()
            }
            None => parent_type,
        };

        let field = self
            .schema
            .field(lookup_type, &selection.name)
            .ok_or_else(|| CompileError::UnknownField {
                type_name: lookup_type.to_string(),
                field: selection.name.clone(),
            })?
            .clone();

        let has_selections = merged
            .members
            .iter()
            .any(|member| !member.selections.is_empty());
        if field.is_leaf && has_selections {
            return Err(CompileError::SelectionOnLeaf {
                type_name: lookup_type.to_string(),
                field: selection.name.clone(),
            });
        }
        if !field.is_leaf && !has_selections {
            return Err(CompileError::MissingSelection {
                type_name: lookup_type.to_string(),
                field: selection.name.clone(),
            });
        }

        let arguments: Arguments = selection
            .arguments
            .iter()
            .map(|(name, value)| (name.clone(), value.resolve(self.variables)))
            .collect();

        let mut path = parent_path.to_vec();
        path.push(selection.response_key().to_string());

        let id = NodeId::try_from(self.nodes.len())?;
        let child_type = field.reduced_type.named_type_name().to_string();
        self.nodes.push(ExecutionNode {
            id,
            name: selection.name.clone(),
            response_key: selection.response_key().to_string(),
            path: path.clone(),
            location: selection.location,
            type_condition: selection.type_condition.clone(),
            arguments,
            children: vec![],
            parent,
            field,
        });

        let children = merge_selections(
            merged
                .members
                .iter()
                .flat_map(|member| member.selections.iter()),
        );
        let mut child_ids = Vec::with_capacity(children.len());
        for child in children {
            child_ids.push(self.compile_selection(&child_type, Some(id), &path, child)?);
        }

        if let Some(node) = self.nodes.get_mut(id.index()) {
            node.children = child_ids;
        }

        Ok(id)
    }
}

impl ExecutionTree {
    /// Binds an operation to the baked schema: every selection becomes an execution node with
    /// its field descriptor and its arguments resolved against `variables`.
    pub fn compile(
        schema: &Schema,
        operation: &Operation,
        variables: &Variables,
    ) -> Result<ExecutionTree, CompileError> {
        let root_type = match operation.kind {
            OperationKind::Query => schema.query_type(),
            OperationKind::Mutation => schema
                .mutation_type()
                .ok_or(CompileError::MissingRootType("mutation"))?,
        };

        let mut compiler = TreeCompiler {
            schema,
            variables,
            nodes: vec![],
        };

        let mut roots = vec![];
        for merged in merge_selections(&operation.selections) {
            roots.push(compiler.compile_selection(root_type, None, &[], merged)?);
        }

        trace!(
            operation = operation.kind.as_str(),
            nodes = compiler.nodes.len(),
            "compiled execution tree"
        );

        Ok(ExecutionTree {
            operation_kind: operation.kind,
            root_type: root_type.to_string(),
            nodes: compiler.nodes,
            roots,
        })
    }
}
