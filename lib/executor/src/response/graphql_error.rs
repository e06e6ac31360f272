use std::{collections::BTreeMap, fmt};

use serde::Serialize;
use serde_json::Value;

use crate::resolver::FieldError;

/// `extensions.code` of errors raised by a field whose type is non-null.
pub const NON_NULL_VIOLATION_CODE: &str = "NON_NULL_VIOLATION";

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<Location>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<ResponsePath>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<BTreeMap<String, Value>>,
}

impl From<String> for GraphQLError {
    fn from(message: String) -> Self {
        GraphQLError {
            message,
            locations: None,
            path: None,
            extensions: None,
        }
    }
}

impl GraphQLError {
    /// Error raised by the field living at `path`. Extensions attached by the resolver are kept.
    pub fn from_field_error(error: FieldError, path: ResponsePath, location: Location) -> Self {
        let message = error.to_string();
        let extensions = match error {
            FieldError::Resolver(resolver_error) => resolver_error.extensions,
            _ => None,
        };

        GraphQLError {
            message,
            locations: Some(vec![location]),
            path: Some(path),
            extensions,
        }
    }

    pub fn with_extension(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extensions
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn extension(&self, key: &str) -> Option<&Value> {
        self.extensions.as_ref().and_then(|ext| ext.get(key))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Location { line, column }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Field(name) => write!(f, "{}", name),
            PathSegment::Index(index) => write!(f, "{}", index),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(value: &str) -> Self {
        PathSegment::Field(value.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(value: usize) -> Self {
        PathSegment::Index(value)
    }
}

/// Position of a value in the response document, list indices included.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ResponsePath(Vec<PathSegment>);

impl ResponsePath {
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field(&self, key: &str) -> ResponsePath {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend_from_slice(&self.0);
        segments.push(PathSegment::Field(key.to_string()));
        ResponsePath(segments)
    }

    pub fn index(&self, index: usize) -> ResponsePath {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend_from_slice(&self.0);
        segments.push(PathSegment::Index(index));
        ResponsePath(segments)
    }
}

impl From<Vec<PathSegment>> for ResponsePath {
    fn from(segments: Vec<PathSegment>) -> Self {
        ResponsePath(segments)
    }
}

impl fmt::Display for ResponsePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// Builds a `ResponsePath` from mixed field names and list indices: `path!["items", 1, "value"]`.
#[macro_export]
macro_rules! path {
    ($($segment:expr),* $(,)?) => {
        $crate::response::graphql_error::ResponsePath::from(vec![
            $($crate::response::graphql_error::PathSegment::from($segment)),*
        ])
    };
}
