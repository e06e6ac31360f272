use std::sync::{Arc, Mutex};

use graft_config::execution::ExecutionConfig;

use crate::{
    execution::error::ExecutionError, response::graphql_error::GraphQLError, schema::Schema,
};

/// Request-wide execution state shared by every node: the schema, the configuration and the
/// append-only error collection.
pub struct ExecutionContext {
    pub schema: Arc<Schema>,
    pub config: ExecutionConfig,
    errors: Mutex<Vec<GraphQLError>>,
}

impl ExecutionContext {
    pub fn new(schema: Arc<Schema>, config: ExecutionConfig) -> Self {
        ExecutionContext {
            schema,
            config,
            errors: Mutex::new(vec![]),
        }
    }

    pub fn add_error(&self, error: GraphQLError) -> Result<(), ExecutionError> {
        self.errors
            .lock()
            .map_err(|_| ExecutionError::PoisonedLock("error collection"))?
            .push(error);
        Ok(())
    }

    pub fn take_errors(&self) -> Result<Vec<GraphQLError>, ExecutionError> {
        let mut errors = self
            .errors
            .lock()
            .map_err(|_| ExecutionError::PoisonedLock("error collection"))?;
        Ok(std::mem::take(&mut *errors))
    }
}
