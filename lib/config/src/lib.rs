mod env_overrides;
pub mod execution;
pub mod log;

use config::{Config, File, FileFormat, FileSourceFile};
use envconfig::Envconfig;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{
    env_overrides::{EnvVarOverrides, EnvVarOverridesError},
    execution::ExecutionConfig,
    log::LoggingConfig,
};

#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GraftConfig {
    /// The logger configuration.
    ///
    /// The engine is configured to be mostly silent (`info`) level in release builds.
    #[serde(default)]
    pub log: LoggingConfig,

    /// Configuration of the field execution engine: concurrency and error reporting.
    #[serde(default)]
    pub execution: ExecutionConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Failed to load configuration: {0}")]
    ConfigLoadError(#[from] config::ConfigError),
    #[error("Failed to apply configuration overrides: {0}")]
    EnvVarOverridesError(#[from] EnvVarOverridesError),
    #[error("Failed to load the environment variables: {0}")]
    EnvVarLoadError(#[from] envconfig::Error),
}

static DEFAULT_FILE_NAMES: &[&str] = &[
    "graft.config.yaml",
    "graft.config.yml",
    "graft.config.json",
];

/// Loads the configuration from `config_path`, or from the first `graft.config.*` file found in the
/// working directory, then applies environment variable overrides.
pub fn load_config(config_path: Option<PathBuf>) -> Result<GraftConfig, ConfigLoadError> {
    let env_overrides = EnvVarOverrides::init_from_env()?;
    let mut config = Config::builder();

    if let Some(path) = config_path {
        let as_file: File<FileSourceFile, _> = path.into();
        config = config.add_source(as_file.required(true));
    } else {
        for name in DEFAULT_FILE_NAMES {
            config = config.add_source(File::with_name(name).required(false));
        }
    }

    config = env_overrides.apply_overrides(config)?;

    Ok(config.build()?.try_deserialize::<GraftConfig>()?)
}

pub fn parse_yaml_config(config_raw: &str) -> Result<GraftConfig, ConfigLoadError> {
    Config::builder()
        .add_source(File::from_str(config_raw, FileFormat::Yaml))
        .build()?
        .try_deserialize::<GraftConfig>()
        .map_err(ConfigLoadError::ConfigLoadError)
}
