use config::{builder::BuilderState, ConfigBuilder, ConfigError, Value};
use envconfig::Envconfig;
use tracing::debug;

use crate::log::{LogFormat, LogLevel};

/// Environment variables that win over any file-based setting.
#[derive(Envconfig)]
pub struct EnvVarOverrides {
    #[envconfig(from = "LOG_LEVEL")]
    pub log_level: Option<LogLevel>,
    #[envconfig(from = "LOG_FORMAT")]
    pub log_format: Option<LogFormat>,
    #[envconfig(from = "LOG_FILTER")]
    pub log_filter: Option<String>,

    #[envconfig(from = "EXECUTION_MAX_CONCURRENT_FIELDS")]
    pub max_concurrent_fields: Option<u64>,
    #[envconfig(from = "EXECUTION_MARK_NON_NULL_VIOLATIONS")]
    pub mark_non_null_violations: Option<bool>,
}

#[derive(Debug, thiserror::Error)]
pub enum EnvVarOverridesError {
    #[error("Failed to override configuration: {0}")]
    FailedToOverrideConfig(#[from] ConfigError),
}

impl EnvVarOverrides {
    /// Config keys paired with the values found in the environment.
    fn into_entries(self) -> Vec<(&'static str, Value)> {
        [
            ("log.level", self.log_level.map(|v| Value::from(v.as_str()))),
            ("log.format", self.log_format.map(|v| Value::from(v.as_str()))),
            ("log.filter", self.log_filter.map(Value::from)),
            (
                "execution.max_concurrent_fields",
                self.max_concurrent_fields.map(Value::from),
            ),
            (
                "execution.mark_non_null_violations",
                self.mark_non_null_violations.map(Value::from),
            ),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|value| (key, value)))
        .collect()
    }

    pub fn apply_overrides<T: BuilderState>(
        self,
        mut config: ConfigBuilder<T>,
    ) -> Result<ConfigBuilder<T>, EnvVarOverridesError> {
        for (key, value) in self.into_entries() {
            debug!(key, value = %value, "applying environment override");
            config = config.set_override(key, value)?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_present_variables_become_overrides() {
        let overrides = EnvVarOverrides {
            log_level: Some(LogLevel::Warn),
            log_format: None,
            log_filter: None,
            max_concurrent_fields: Some(8),
            mark_non_null_violations: Some(false),
        };

        let keys: Vec<&str> = overrides
            .into_entries()
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        assert_eq!(
            keys,
            vec![
                "log.level",
                "execution.max_concurrent_fields",
                "execution.mark_non_null_violations"
            ]
        );
    }
}
