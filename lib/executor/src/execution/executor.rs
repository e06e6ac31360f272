use std::sync::Arc;

use futures::{future::BoxFuture, FutureExt};
use graft_config::execution::ExecutionConfig;
use serde_json::Value;
use tracing::{debug, error, instrument, trace};

use crate::{
    context::ExecutionContext,
    execution::{
        compile::{Operation, OperationKind, Variables},
        concurrency::ConcurrencyScope,
        error::{ExecutionError, RequestError},
        node::{ExecutionNode, ExecutionTree, NodeId},
    },
    request_state::RequestState,
    resolver::{FieldError, FieldExecutor, Info, RawOutcome},
    response::{
        document::ResponseDocument,
        graphql_error::{GraphQLError, ResponsePath, NON_NULL_VIOLATION_CODE},
        response::ExecutionResponse,
    },
    schema::Schema,
};

/// Compiles `operation` against the schema and executes it.
pub async fn execute_operation(
    schema: Arc<Schema>,
    operation: &Operation,
    variables: &Variables,
    root_value: &Value,
    state: &RequestState,
    config: &ExecutionConfig,
) -> Result<ExecutionResponse, RequestError> {
    let tree = ExecutionTree::compile(&schema, operation, variables)?;
    Ok(execute(schema, &tree, root_value, state, config).await?)
}

/// Executes a compiled tree. Field failures end up in the response; only orchestration faults
/// are returned as `Err`.
#[instrument(
    level = "trace",
    skip_all,
    fields(
        operation = tree.operation_kind.as_str(),
        root_type = %tree.root_type,
    )
)]
pub async fn execute(
    schema: Arc<Schema>,
    tree: &ExecutionTree,
    root_value: &Value,
    state: &RequestState,
    config: &ExecutionConfig,
) -> Result<ExecutionResponse, ExecutionError> {
    let context = ExecutionContext::new(schema, config.clone());
    let document = ResponseDocument::new();
    let executor = Executor {
        tree,
        context: &context,
        state,
        document: &document,
    };

    if let Err(err) = executor.execute_root(root_value).await {
        error!(error = %err, "execution aborted");
        return Err(err);
    }

    let errors = context.take_errors()?;
    let data = document.into_data()?;

    trace!(errors = errors.len(), has_data = data.is_some(), "execution finished");

    Ok(ExecutionResponse { data, errors })
}

/// Nodes sharing one response key that apply to the same value. The first one resolves the
/// field; the sub-selections of all of them are merged.
struct FieldGroup<'a> {
    node: &'a ExecutionNode,
    merged: Vec<&'a ExecutionNode>,
}

impl FieldGroup<'_> {
    fn child_ids(&self) -> Vec<NodeId> {
        self.merged
            .iter()
            .flat_map(|node| node.children.iter().copied())
            .collect()
    }
}

struct Executor<'exec> {
    tree: &'exec ExecutionTree,
    context: &'exec ExecutionContext,
    state: &'exec RequestState,
    document: &'exec ResponseDocument,
}

impl<'exec> Executor<'exec> {
    async fn execute_root(&self, root_value: &Value) -> Result<(), ExecutionError> {
        let root_type = self.tree.root_type.as_str();
        let root_path = ResponsePath::default();
        let roots = self.select(self.tree.roots.iter().copied(), root_type)?;

        self.document.prepare_object(
            &root_path,
            roots.iter().map(|group| group.node.response_key.as_str()),
        )?;

        match self.tree.operation_kind {
            OperationKind::Mutation => {
                for group in roots {
                    let path = root_path.field(&group.node.response_key);
                    self.invoke_node(group, root_value, root_type, path).await?;
                }
                Ok(())
            }
            OperationKind::Query => {
                let mut scope = ConcurrencyScope::new(self.context.config.concurrency_limit());
                for group in roots {
                    let path = root_path.field(&group.node.response_key);
                    scope.spawn(self.invoke_node(group, root_value, root_type, path));
                }
                scope.join_all().await
            }
        }
    }

    /// Resolves one field instance, writes its slot, then either reports the failure or fans
    /// out its children against the raw result.
    fn invoke_node<'a>(
        &'a self,
        group: FieldGroup<'a>,
        parent: &'a Value,
        parent_type: &'a str,
        path: ResponsePath,
    ) -> BoxFuture<'a, Result<(), ExecutionError>> {
        async move {
            let node = group.node;
            let field = node.field.as_ref();
            let info = Info {
                node,
                field,
                schema: &self.context.schema,
                path: &path,
                location: node.location,
                context: self.context,
                parent_type_name: parent_type,
            };

            trace!(node = %node.id, path = %path, "invoking field");
            let (outcome, coerced) = field
                .invoke(parent, &node.arguments, self.state, &info)
                .await;

            self.document.write(&path, coerced)?;

            match outcome {
                RawOutcome::Failed(error) => self.fail(node, error, &path),
                RawOutcome::Resolved(raw) => {
                    let child_ids = group.child_ids();
                    if child_ids.is_empty() {
                        return Ok(());
                    }

                    let mut scope = ConcurrencyScope::new(self.context.config.concurrency_limit());
                    self.spawn_children(
                        &mut scope,
                        node,
                        &child_ids,
                        &raw,
                        path,
                        field.list_depth(),
                    )?;
                    scope.join_all().await
                }
            }
        }
        .boxed()
    }

    /// Walks `list_depth` list layers of `raw`, one index segment per layer, and spawns the
    /// merged children of `node` against every non-null element.
    fn spawn_children<'a>(
        &'a self,
        scope: &mut ConcurrencyScope<'a, Result<(), ExecutionError>>,
        node: &'a ExecutionNode,
        child_ids: &[NodeId],
        raw: &'a Value,
        path: ResponsePath,
        depth: usize,
    ) -> Result<(), ExecutionError> {
        if raw.is_null() {
            return Ok(());
        }

        if depth > 0 {
            let Value::Array(items) = raw else {
                return Err(ExecutionError::ListShapeMismatch {
                    field: node.name.clone(),
                    path,
                });
            };
            for (index, item) in items.iter().enumerate() {
                self.spawn_children(scope, node, child_ids, item, path.index(index), depth - 1)?;
            }
            return Ok(());
        }

        let runtime_type = runtime_type(node, raw);
        let children = self.select(child_ids.iter().copied(), runtime_type)?;

        self.document.prepare_object(
            &path,
            children.iter().map(|group| group.node.response_key.as_str()),
        )?;

        for group in children {
            let child_path = path.field(&group.node.response_key);
            scope.spawn(self.invoke_node(group, raw, runtime_type, child_path));
        }

        Ok(())
    }

    /// Nodes that apply to a value of `runtime_type`, grouped by response key in first
    /// appearance order.
    fn select(
        &self,
        ids: impl IntoIterator<Item = NodeId>,
        runtime_type: &str,
    ) -> Result<Vec<FieldGroup<'exec>>, ExecutionError> {
        let possible_types = self.context.schema.possible_types();
        let mut groups: Vec<FieldGroup<'exec>> = Vec::new();

        for id in ids {
            let node = self.tree.node(id)?;
            let applies = node.type_condition.as_deref().map_or(true, |condition| {
                possible_types.entity_satisfies_type_condition(runtime_type, condition)
            });
            if !applies {
                continue;
            }

            match groups
                .iter_mut()
                .find(|group| group.node.response_key == node.response_key)
            {
                Some(group) => group.merged.push(node),
                None => groups.push(FieldGroup {
                    node,
                    merged: vec![node],
                }),
            }
        }

        Ok(groups)
    }

    fn fail(
        &self,
        node: &ExecutionNode,
        error: FieldError,
        path: &ResponsePath,
    ) -> Result<(), ExecutionError> {
        let field = node.field.as_ref();
        let mut graphql_error = GraphQLError::from_field_error(error, path.clone(), node.location);
        if field.cant_be_null() && self.context.config.mark_non_null_violations {
            graphql_error = graphql_error.with_extension("code", NON_NULL_VIOLATION_CODE);
        }

        trace!(path = %path, error = %graphql_error.message, "field failed");
        self.context.add_error(graphql_error)?;

        if field.cant_be_null() {
            self.bubble_error(node, path)?;
        }
        Ok(())
    }

    /// Nulls the slot of the nearest nullable ancestor on the failing instance's path, or the
    /// whole document when every ancestor is non-null.
    fn bubble_error(
        &self,
        failing: &ExecutionNode,
        path: &ResponsePath,
    ) -> Result<(), ExecutionError> {
        for ancestor in self.tree.ancestors(failing.id) {
            if !ancestor.field.cant_be_null() {
                let slot = self.tree.slot_path(ancestor.id, path)?;
                debug!(failing = %path, nulled = %slot, "non-null failure bubbled");
                return self.document.null_slot(&slot);
            }
        }

        debug!(failing = %path, "non-null failure reached the root, nulling data");
        self.document.null_document()
    }
}

/// Abstract types take the runtime type from `__typename` of the raw value.
fn runtime_type<'a>(node: &'a ExecutionNode, raw: &'a Value) -> &'a str {
    let reduced_type = &node.field.reduced_type;
    if reduced_type.is_abstract() {
        if let Some(type_name) = raw.get("__typename").and_then(Value::as_str) {
            return type_name;
        }
    }
    reduced_type.named_type_name()
}
