use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use graft_config::execution::ExecutionConfig;
use serde_json::{json, Value};

use crate::{
    execute_operation,
    resolver::{Info, Resolver, ResolverError},
    schema::directives::Arguments,
    ExecutionResponse, Operation, RequestState, Schema, Variables,
};

mod execution_order;
mod lists;
mod null_propagation;

pub(crate) async fn run(schema: Schema, operation: Operation) -> ExecutionResponse {
    run_with(schema, operation, ExecutionConfig::default()).await
}

pub(crate) async fn run_with(
    schema: Schema,
    operation: Operation,
    config: ExecutionConfig,
) -> ExecutionResponse {
    execute_operation(
        Arc::new(schema),
        &operation,
        &Variables::new(),
        &json!({}),
        &RequestState::default(),
        &config,
    )
    .await
    .unwrap()
}

/// Errors as a sorted `(message, path)` multiset, independent of completion order.
pub(crate) fn error_set(response: &ExecutionResponse) -> Vec<(String, String)> {
    let mut errors: Vec<(String, String)> = response
        .errors
        .iter()
        .map(|error| {
            (
                error.message.clone(),
                error
                    .path
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
            )
        })
        .collect();
    errors.sort();
    errors
}

pub(crate) fn error(message: &str, path: &str) -> (String, String) {
    (message.to_string(), path.to_string())
}

/// Always fails with the given message.
pub(crate) struct Failing(pub &'static str);

#[async_trait]
impl Resolver for Failing {
    async fn resolve(
        &self,
        _parent: &Value,
        _arguments: &Arguments,
        _state: &RequestState,
        _info: &Info<'_>,
    ) -> Result<Value, ResolverError> {
        Err(ResolverError::new(self.0))
    }
}

/// Sleeps, records its label in `log` and returns `value`.
pub(crate) struct Recording {
    pub label: &'static str,
    pub delay: Duration,
    pub log: Arc<Mutex<Vec<&'static str>>>,
    pub value: Value,
}

#[async_trait]
impl Resolver for Recording {
    async fn resolve(
        &self,
        _parent: &Value,
        _arguments: &Arguments,
        _state: &RequestState,
        _info: &Info<'_>,
    ) -> Result<Value, ResolverError> {
        tokio::time::sleep(self.delay).await;
        self.log.lock().unwrap().push(self.label);
        Ok(self.value.clone())
    }
}

/// Resolves `value-<n>` from the parent's `n` after a short delay, failing for `fail_on`.
/// Counts completed invocations and records the runtime path of every call.
pub(crate) struct ElementValue {
    pub fail_on: Vec<u64>,
    pub completed: Arc<AtomicUsize>,
    pub paths: Arc<Mutex<Vec<String>>>,
}

impl ElementValue {
    pub fn failing_on(fail_on: impl IntoIterator<Item = u64>) -> Self {
        ElementValue {
            fail_on: fail_on.into_iter().collect(),
            completed: Arc::new(AtomicUsize::new(0)),
            paths: Arc::new(Mutex::new(vec![])),
        }
    }
}

#[async_trait]
impl Resolver for ElementValue {
    async fn resolve(
        &self,
        parent: &Value,
        _arguments: &Arguments,
        _state: &RequestState,
        info: &Info<'_>,
    ) -> Result<Value, ResolverError> {
        self.paths.lock().unwrap().push(info.path.to_string());
        let n = parent["n"].as_u64().unwrap_or_default();
        if self.fail_on.contains(&n) {
            return Err(ResolverError::new(format!("value {} unavailable", n)));
        }

        tokio::time::sleep(Duration::from_millis(10)).await;
        self.completed.fetch_add(1, Ordering::SeqCst);
        Ok(json!(format!("value-{}", n)))
    }
}
