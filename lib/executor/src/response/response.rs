use serde::Serialize;
use serde_json::Value;

use crate::response::graphql_error::GraphQLError;

/// Result of executing an operation. `data` is `None` when a non-null failure reached the root.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExecutionResponse {
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphQLError>,
}

#[derive(thiserror::Error, Debug)]
#[error("Failed to serialize the execution response: {0}")]
pub struct ResponseSerializationError(#[from] sonic_rs::Error);

impl ExecutionResponse {
    pub fn to_vec(&self) -> Result<Vec<u8>, ResponseSerializationError> {
        Ok(sonic_rs::to_vec(self)?)
    }

    pub fn to_string_pretty(&self) -> Result<String, ResponseSerializationError> {
        Ok(sonic_rs::to_string_pretty(self)?)
    }

    pub fn error_paths(&self) -> Vec<String> {
        self.errors
            .iter()
            .map(|error| {
                error
                    .path
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default()
            })
            .collect()
    }
}
