pub mod stdout;
pub mod utils;

use graft_config::log::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Registry};

use crate::logging::{stdout::build_stdout_layer, utils::DynLayer};

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },
    #[error("Failed to install the global logger: {0}")]
    InstallFailed(#[from] tracing_subscriber::util::TryInitError),
}

pub fn logging_layers_from_logger_config<S>(
    config: &LoggingConfig,
) -> Result<(Vec<DynLayer<S>>, Vec<WorkerGuard>), LoggingError>
where
    S: tracing::Subscriber
        + for<'span> tracing_subscriber::registry::LookupSpan<'span>
        + Send
        + Sync,
{
    let (layer, guard) = build_stdout_layer(config, std::io::stdout())?;

    Ok((vec![layer], vec![guard]))
}

/// Installs the global subscriber. The returned guards flush the non-blocking writers on drop,
/// so they have to live as long as the process logs.
pub fn init_logging(config: &LoggingConfig) -> Result<Vec<WorkerGuard>, LoggingError> {
    let (layers, guards) = logging_layers_from_logger_config::<Registry>(config)?;

    tracing_subscriber::registry().with(layers).try_init()?;

    Ok(guards)
}
