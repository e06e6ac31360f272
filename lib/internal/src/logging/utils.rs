use tracing_subscriber::{EnvFilter, Layer};

use crate::logging::LoggingError;

pub type DynLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

/// Builds the filter from `log.filter` when set, otherwise from `log.level`.
pub fn create_env_filter(filter: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(filter).map_err(|err| LoggingError::InvalidFilter {
        filter: filter.to_string(),
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::create_env_filter;

    #[test]
    fn accepts_levels_and_directives() {
        assert!(create_env_filter("info").is_ok());
        assert!(create_env_filter("graft_executor=trace,warn").is_ok());
    }

    #[test]
    fn rejects_malformed_directives() {
        let err = create_env_filter("graft_executor=loud").unwrap_err();
        assert!(err.to_string().contains("graft_executor=loud"));
    }
}
