use anyhow::Result;
use colored::Colorize;
use course_catalog::{config, init_tracing, server};
use std::path::Path;
use tracing::info;

/// Execute the start command
///
/// Loads configuration, installs the log subscriber and serves until a
/// shutdown signal arrives.
pub async fn execute(config_path: &Path, port: Option<u16>) -> Result<()> {
    let mut cfg = config::load_config(config_path)?;
    if let Some(port) = port {
        cfg.server.port = port;
        config::validate_config(&cfg)?;
    }

    init_tracing(&cfg.observability);

    println!(
        "{} {}:{}",
        "Starting course catalog on".green(),
        cfg.server.host,
        cfg.server.port
    );
    info!(
        config = %config_path.display(),
        trace_endpoint = cfg.observability.trace_endpoint.as_deref().unwrap_or("none"),
        console_exporter = cfg.observability.console_exporter,
        "Configuration loaded"
    );

    server::start_server(cfg).await?;

    Ok(())
}
