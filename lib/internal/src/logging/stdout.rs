use std::io::{IsTerminal, Write};

use graft_config::log::{LogFormat, LoggingConfig};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt::time::UtcTime, Layer};

use crate::logging::{
    utils::{create_env_filter, DynLayer},
    LoggingError,
};

/// Builds a formatting layer writing to `writer` through a non-blocking worker.
/// `is_terminal` decides whether ANSI colors are emitted, so only real stdout gets them.
pub fn build_stdout_layer<S, W>(
    config: &LoggingConfig,
    writer: W,
) -> Result<(DynLayer<S>, WorkerGuard), LoggingError>
where
    S: tracing::Subscriber
        + for<'span> tracing_subscriber::registry::LookupSpan<'span>
        + Send
        + Sync,
    W: Write + IsTerminal + Send + 'static,
{
    let is_terminal = writer.is_terminal();
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(writer);
    let filter = create_env_filter(config.env_filter_str())?;
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(non_blocking_writer);
    let timer = UtcTime::rfc_3339();

    let layer = match config.format {
        LogFormat::Json => fmt_layer
            .json()
            .with_timer(timer)
            .with_thread_ids(false)
            .with_target(true)
            .with_ansi(false)
            .flatten_event(true)
            .with_filter(filter)
            .boxed(),
        LogFormat::Text => fmt_layer
            .compact()
            .with_thread_ids(false)
            .with_timer(timer)
            .with_target(false)
            .with_ansi(is_terminal)
            .with_filter(filter)
            .boxed(),
    };

    Ok((layer, guard))
}
