use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ExecutionConfig {
    /// Maximum number of child field invocations polled at the same time for a single
    /// selection fan-out (all fields of an object, or all elements of a list).
    /// If not specified, every child runs concurrently.
    ///
    /// Can also be set via the `EXECUTION_MAX_CONCURRENT_FIELDS` environment variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrent_fields: Option<usize>,

    /// Adds `extensions.code = "NON_NULL_VIOLATION"` to errors raised by fields whose type is non-null.
    ///
    /// Can also be set via the `EXECUTION_MARK_NON_NULL_VIOLATIONS` environment variable.
    #[serde(default = "default_mark_non_null_violations")]
    pub mark_non_null_violations: bool,

    /// Converts a panicking resolver into a field error instead of tearing down the request.
    #[serde(default = "default_catch_resolver_panics")]
    pub catch_resolver_panics: bool,
}

fn default_mark_non_null_violations() -> bool {
    true
}

fn default_catch_resolver_panics() -> bool {
    true
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            max_concurrent_fields: None,
            mark_non_null_violations: default_mark_non_null_violations(),
            catch_resolver_panics: default_catch_resolver_panics(),
        }
    }
}

impl ExecutionConfig {
    /// `None` means unbounded. A configured `0` is treated as unbounded as well.
    pub fn concurrency_limit(&self) -> Option<usize> {
        self.max_concurrent_fields.filter(|limit| *limit > 0)
    }
}
