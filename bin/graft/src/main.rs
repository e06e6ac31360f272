mod catalog;

use std::sync::Arc;

use graft_config::load_config;
use graft_executor::{execute_operation, RequestState, Variables};
use graft_internal::logging::init_logging;
use serde_json::json;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::var("GRAFT_CONFIG_FILE_PATH").ok();
    let config = load_config(config_path.map(Into::into))?;
    let _guards = init_logging(&config.log)?;

    let schema = Arc::new(catalog::schema()?);
    info!(
        max_concurrent_fields = ?config.execution.max_concurrent_fields,
        "schema ready, executing sample operation"
    );

    let response = execute_operation(
        schema,
        &catalog::operation(),
        &Variables::from_iter([("first".to_string(), json!(3))]),
        &json!({}),
        &RequestState::default(),
        &config.execution,
    )
    .await?;

    println!("{}", response.to_string_pretty()?);

    Ok(())
}
